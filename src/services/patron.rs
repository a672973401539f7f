//! Patron account operations: login, holds, fines, profile, checkouts and renewals

use std::sync::Arc;

use indexmap::IndexMap;
use rust_decimal::{prelude::ToPrimitive, Decimal};

use crate::{
    config::BehaviorsConfig,
    error::{AppError, AppResult},
    models::{
        dates,
        patron::{
            AccountInfoOptions, CancelHoldItem, CancelHoldsResult, Fine, HoldOptions, HoldRequest,
            HoldResult, Patron, PatronHold, Profile, RenewalResult, RenewalResults, Transaction,
        },
    },
    services::{
        policies::PolicyCache,
        session::{session_key, SessionStore},
        symws::SymphonyService,
    },
};

const SESSION_TOKEN_KEY: &str = "sessionToken";

#[derive(Clone)]
pub struct PatronService {
    symws: Arc<dyn SymphonyService>,
    sessions: Arc<dyn SessionStore>,
    behaviors: BehaviorsConfig,
}

impl PatronService {
    pub fn new(
        symws: Arc<dyn SymphonyService>,
        sessions: Arc<dyn SessionStore>,
        behaviors: BehaviorsConfig,
    ) -> Self {
        Self {
            symws,
            sessions,
            behaviors,
        }
    }

    /// Whether the front-end should hide its login options
    pub fn login_is_hidden(&self) -> bool {
        self.behaviors.show_account_login == Some(false)
    }

    /// Authenticate against symws and bind the returned token to the session
    pub async fn login(&self, session_id: &str, username: &str, password: &str) -> AppResult<Patron> {
        let login = self.symws.login_user(username, password).await.map_err(|e| {
            tracing::info!("Patron login rejected for {}: {}", username, e);
            AppError::Authentication("Invalid patron credentials".to_string())
        })?;

        let token = login
            .session_token
            .ok_or_else(|| AppError::Authentication("Invalid patron credentials".to_string()))?;

        let options = AccountInfoOptions {
            include_patron_info: Some("ALL".to_string()),
            include_patron_address_info: Some("ACTIVE".to_string()),
            ..Default::default()
        };
        let account = self.symws.lookup_my_account_info(&token, &options).await?;
        let info = account
            .patron_info
            .ok_or_else(|| AppError::InvalidRecord("Account lookup returned no patron info".to_string()))?;
        let (lastname, firstname) = info.split_name();

        // The session counts as logged in only once the account resolved
        self.sessions
            .set(&session_key(session_id, SESSION_TOKEN_KEY), &token)
            .await?;

        tracing::info!("Patron {} logged in", info.user_id);
        Ok(Patron {
            id: info.user_id,
            firstname,
            lastname,
            cat_username: username.to_string(),
            email: None,
            major: None,
            college: None,
        })
    }

    /// Session teardown: forget the token and the policy tables
    pub async fn logout(&self, session_id: &str) -> AppResult<()> {
        self.sessions
            .remove(&session_key(session_id, SESSION_TOKEN_KEY))
            .await?;
        PolicyCache::new(self.sessions.clone(), session_id)
            .invalidate()
            .await
    }

    async fn session_token(&self, session_id: &str) -> AppResult<String> {
        self.sessions
            .get(&session_key(session_id, SESSION_TOKEN_KEY))
            .await?
            .ok_or_else(|| AppError::Authentication("Patron is not logged in".to_string()))
    }

    pub async fn get_my_holds(&self, session_id: &str) -> AppResult<Vec<PatronHold>> {
        let token = self.session_token(session_id).await?;
        let options = AccountInfoOptions {
            include_patron_hold_info: Some("ACTIVE".to_string()),
            ..Default::default()
        };
        let account = self.symws.lookup_my_account_info(&token, &options).await?;

        Ok(account
            .patron_hold_info
            .into_iter()
            .map(|hold| PatronHold {
                id: hold.title_key,
                location: hold.pickup_library_id,
                reqnum: hold.hold_key,
                expire: hold.expires_date.as_deref().map(dates::display_date),
                create: hold.placed_date.as_deref().map(dates::display_date),
                position: hold.queue_position,
                available: hold.available,
                item_id: hold.item_id,
                title: hold.title,
            })
            .collect())
    }

    /// Fines with amounts in cents
    pub async fn get_my_fines(&self, session_id: &str) -> AppResult<Vec<Fine>> {
        let token = self.session_token(session_id).await?;
        let options = AccountInfoOptions {
            include_fee_info: Some(self.behaviors.show_fee_type.clone()),
            ..Default::default()
        };
        let account = self.symws.lookup_my_account_info(&token, &options).await?;

        Ok(account
            .fee_info
            .into_iter()
            .map(|fee| {
                let item = fee.fee_item_info.unwrap_or_default();
                Fine {
                    amount: to_cents(fee.amount.value),
                    checkout: item.checkout_date,
                    fine: fee.bill_reason_description,
                    balance: to_cents(fee.amount_outstanding.value),
                    createdate: item.date_billed,
                    duedate: item.due_date,
                    id: item.title_key,
                }
            })
            .collect())
    }

    pub async fn get_my_profile(&self, session_id: &str) -> AppResult<Profile> {
        let token = self.session_token(session_id).await?;
        let options = AccountInfoOptions {
            include_patron_info: Some("ALL".to_string()),
            include_patron_address_info: Some("ACTIVE".to_string()),
            include_patron_status_info: Some("ALL".to_string()),
            ..Default::default()
        };
        let account = self.symws.lookup_my_account_info(&token, &options).await?;

        let info = account
            .patron_info
            .ok_or_else(|| AppError::InvalidRecord("Account lookup returned no patron info".to_string()))?;
        let (lastname, firstname) = info.split_name();

        // Address lines come in a fixed order: street, city/state, zip, phone
        let lines = account
            .patron_address_info
            .map(|a| a.address1)
            .unwrap_or_default();
        let line = |i: usize| lines.get(i).and_then(|l| l.address_value.clone());

        Ok(Profile {
            lastname,
            firstname,
            address1: line(0),
            address2: line(1),
            zip: line(2),
            phone: line(3),
            group: info.group_id,
        })
    }

    pub async fn get_my_transactions(&self, session_id: &str) -> AppResult<Vec<Transaction>> {
        let token = self.session_token(session_id).await?;
        let options = AccountInfoOptions {
            include_patron_checkout_info: Some("ALL".to_string()),
            ..Default::default()
        };
        let account = self.symws.lookup_my_account_info(&token, &options).await?;

        Ok(account
            .patron_checkout_info
            .into_iter()
            .map(|checkout| Transaction {
                duedate: checkout.due_date.as_deref().map(dates::display_date),
                id: checkout.title_key,
                barcode: checkout.item_id.clone(),
                renew: checkout.renewals,
                request: checkout.recall_notices_sent,
                renewable: checkout.unseen_renewals_remaining > 0,
                title: checkout.title,
                item_id: checkout.item_id,
            })
            .collect())
    }

    /// Renew each barcode independently
    pub async fn renew_my_items(&self, session_id: &str, barcodes: &[String]) -> AppResult<RenewalResults> {
        let token = self.session_token(session_id).await?;
        let mut details = IndexMap::new();

        for barcode in barcodes {
            let result = match self.symws.renew_my_checkout(&token, barcode).await {
                Ok(renewal) => RenewalResult {
                    success: true,
                    new_date: renewal.due_date.as_deref().map(dates::short_date),
                    new_time: renewal.due_date.as_deref().map(dates::clock_time),
                    item_id: renewal.item_id,
                    sys_message: renewal.message,
                },
                Err(e) => {
                    tracing::warn!("Renewal of {} failed: {}", barcode, e);
                    RenewalResult {
                        success: false,
                        new_date: None,
                        new_time: None,
                        item_id: None,
                        sys_message: Some(format!("We could not renew this item: {}", e)),
                    }
                }
            };
            details.insert(barcode.clone(), result);
        }

        Ok(RenewalResults { details })
    }

    pub async fn place_hold(&self, session_id: &str, request: HoldRequest) -> AppResult<HoldResult> {
        let token = self.session_token(session_id).await?;
        let options = HoldOptions::from(request);

        Ok(match self.symws.create_my_hold(&token, &options).await {
            Ok(()) => HoldResult {
                success: true,
                sys_message: "Your hold has been placed.".to_string(),
            },
            Err(e) => {
                tracing::warn!("Hold placement failed: {}", e);
                HoldResult {
                    success: false,
                    sys_message: format!("We could not place the hold: {}", e),
                }
            }
        })
    }

    /// Cancel each hold independently
    pub async fn cancel_holds(&self, session_id: &str, hold_keys: &[String]) -> AppResult<CancelHoldsResult> {
        let token = self.session_token(session_id).await?;
        let mut count = 0;
        let mut items = IndexMap::new();

        for hold_key in hold_keys {
            let item = match self.symws.cancel_my_hold(&token, hold_key).await {
                Ok(()) => {
                    count += 1;
                    CancelHoldItem {
                        success: true,
                        status: "hold_cancel_success".to_string(),
                        sys_message: None,
                    }
                }
                Err(e) => CancelHoldItem {
                    success: false,
                    status: "hold_cancel_fail".to_string(),
                    sys_message: Some(e.to_string()),
                },
            };
            items.insert(hold_key.clone(), item);
        }

        Ok(CancelHoldsResult { count, items })
    }
}

fn to_cents(amount: Decimal) -> i64 {
    (amount * Decimal::ONE_HUNDRED).round().to_i64().unwrap_or_default()
}
