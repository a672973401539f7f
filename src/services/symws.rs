//! Symphony Web Services client
//!
//! Talks to the symws REST endpoints (`standard`, `admin`, `security`, `patron`)
//! with JSON output. Every call is attempted exactly once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    config::SymwsConfig,
    error::{AppError, AppResult},
    models::{
        patron::{AccountInfoOptions, HoldOptions, LoginUserResponse, MyAccountInfo, RenewMyCheckoutResponse},
        policy::PolicyListResponse,
        title::LookupTitleInfoResponse,
        PolicyGroup, TitleRecord,
    },
};

const CLIENT_ID_HEADER: &str = "x-sirs-clientID";
const SESSION_TOKEN_HEADER: &str = "x-sirs-sessionToken";

/// Detail options of every title lookup; not caller-configurable
pub const TITLE_LOOKUP_OPTIONS: [(&str, &str); 8] = [
    ("includeAvailabilityInfo", "true"),
    ("includeCallNumberSummary", "true"),
    ("includeItemInfo", "true"),
    ("includeOrderInfo", "true"),
    ("includeOPACInfo", "true"),
    ("includeBoundTogether", "true"),
    ("includeMarcHoldings", "true"),
    ("marcEntryFilter", "NONE"),
];

/// Remote operations offered by Symphony Web Services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SymphonyService: Send + Sync {
    /// Title lookup with the fixed detail options
    async fn lookup_title_info(&self, title_id: &str) -> AppResult<TitleRecord>;

    async fn lookup_library_policies(&self) -> AppResult<Vec<PolicyGroup>>;
    async fn lookup_location_policies(&self) -> AppResult<Vec<PolicyGroup>>;
    async fn lookup_item_type_policies(&self) -> AppResult<Vec<PolicyGroup>>;

    async fn login_user(&self, login: &str, password: &str) -> AppResult<LoginUserResponse>;

    async fn lookup_my_account_info(
        &self,
        session_token: &str,
        options: &AccountInfoOptions,
    ) -> AppResult<MyAccountInfo>;

    async fn create_my_hold(&self, session_token: &str, options: &HoldOptions) -> AppResult<()>;
    async fn cancel_my_hold(&self, session_token: &str, hold_key: &str) -> AppResult<()>;
    async fn renew_my_checkout(
        &self,
        session_token: &str,
        item_id: &str,
    ) -> AppResult<RenewMyCheckoutResponse>;
}

/// Fault body returned by symws on failure
#[derive(Debug, Deserialize)]
struct FaultBody {
    #[serde(rename = "faultResponse")]
    fault_response: Option<FaultResponse>,
}

#[derive(Debug, Deserialize)]
struct FaultResponse {
    #[serde(default)]
    string: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Clone)]
pub struct SymwsClient {
    http: Client,
    base_url: String,
    client_id: String,
}

impl SymwsClient {
    pub fn new(config: &SymwsConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            client_id: config.client_id.clone(),
        })
    }

    fn request(&self, service: &str, operation: &str, session_token: Option<&str>) -> RequestBuilder {
        let url = format!("{}rest/{}/{}", self.base_url, service, operation);
        let mut request = self
            .http
            .get(url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .query(&[("json", "true")]);
        if let Some(token) = session_token {
            request = request.header(SESSION_TOKEN_HEADER, token);
        }
        request
    }

    /// Send a request and decode its JSON body, mapping faults to typed errors
    async fn call<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> AppResult<T> {
        tracing::debug!("symws call: {}", operation);

        let response = request.send().await.map_err(|e| {
            tracing::warn!("symws {} transport failure: {}", operation, e);
            AppError::ExternalService(format!("{}: {}", operation, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let fault = serde_json::from_str::<FaultBody>(&body)
                .ok()
                .and_then(|b| b.fault_response);
            let message = fault
                .as_ref()
                .and_then(|f| f.string.clone())
                .unwrap_or_else(|| status.to_string());
            tracing::warn!(
                "symws {} failed with {} ({:?})",
                operation,
                status,
                fault.as_ref().and_then(|f| f.code.as_deref())
            );
            return Err(if status == StatusCode::NOT_FOUND {
                AppError::NotFound(message)
            } else {
                AppError::ExternalService(format!("{}: {}", operation, message))
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| AppError::InvalidRecord(format!("{}: {}", operation, e)))
    }

    async fn policy_list(&self, operation: &str) -> AppResult<Vec<PolicyGroup>> {
        let request = self.request("admin", operation, None);
        let response: PolicyListResponse = self.call(operation, request).await?;
        Ok(response.into())
    }
}

#[async_trait]
impl SymphonyService for SymwsClient {
    async fn lookup_title_info(&self, title_id: &str) -> AppResult<TitleRecord> {
        tracing::info!("Looking up title {}", title_id);
        let request = self
            .request("standard", "lookupTitleInfo", None)
            .query(&[("titleID", title_id)])
            .query(&TITLE_LOOKUP_OPTIONS);

        let response: LookupTitleInfoResponse = self.call("lookupTitleInfo", request).await?;
        response
            .title_info
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("Title {} not found", title_id)))
    }

    async fn lookup_library_policies(&self) -> AppResult<Vec<PolicyGroup>> {
        self.policy_list("lookupLibraryPolicyList").await
    }

    async fn lookup_location_policies(&self) -> AppResult<Vec<PolicyGroup>> {
        self.policy_list("lookupLocationPolicyList").await
    }

    async fn lookup_item_type_policies(&self) -> AppResult<Vec<PolicyGroup>> {
        self.policy_list("lookupItemTypePolicyList").await
    }

    async fn login_user(&self, login: &str, password: &str) -> AppResult<LoginUserResponse> {
        tracing::info!("Logging in patron {}", login);
        let request = self
            .request("security", "loginUser", None)
            .query(&[("login", login), ("password", password)]);
        self.call("loginUser", request).await
    }

    async fn lookup_my_account_info(
        &self,
        session_token: &str,
        options: &AccountInfoOptions,
    ) -> AppResult<MyAccountInfo> {
        let request = self
            .request("patron", "lookupMyAccountInfo", Some(session_token))
            .query(options);
        self.call("lookupMyAccountInfo", request).await
    }

    async fn create_my_hold(&self, session_token: &str, options: &HoldOptions) -> AppResult<()> {
        let request = self
            .request("patron", "createMyHold", Some(session_token))
            .query(options);
        let _: serde_json::Value = self.call("createMyHold", request).await?;
        Ok(())
    }

    async fn cancel_my_hold(&self, session_token: &str, hold_key: &str) -> AppResult<()> {
        let request = self
            .request("patron", "cancelMyHold", Some(session_token))
            .query(&[("holdKey", hold_key)]);
        let _: serde_json::Value = self.call("cancelMyHold", request).await?;
        Ok(())
    }

    async fn renew_my_checkout(
        &self,
        session_token: &str,
        item_id: &str,
    ) -> AppResult<RenewMyCheckoutResponse> {
        let request = self
            .request("patron", "renewMyCheckout", Some(session_token))
            .query(&[("itemID", item_id)]);
        self.call("renewMyCheckout", request).await
    }
}
