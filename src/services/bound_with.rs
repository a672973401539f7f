//! Bound-with resolution: follow a child title to its shelved parent's holdings

use crate::{
    error::AppResult,
    models::{BoundWithLink, CallGroup, TitleRecord},
    services::symws::SymphonyService,
};

/// Call groups to normalize, plus the bound-with context they came from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedHoldings {
    pub call_groups: Vec<CallGroup>,
    /// Only items shelved under this call number belong to the requested title
    pub filter_call_number: Option<String>,
    pub parent_id: Option<String>,
    pub parent_title: Option<String>,
}

/// Last link flagged `linkedAsParent`, if the record declares any links at all
pub fn parent_link(record: &TitleRecord) -> Option<&BoundWithLink> {
    if record.number_of_bound_with_links == 0 {
        return None;
    }
    record
        .bound_with_links
        .iter()
        .filter(|link| link.linked_as_parent)
        .last()
}

/// Resolve the holdings tree to normalize for `record`.
///
/// When a parent link names a title, the parent is fetched once and its
/// call groups replace the record's own.
pub async fn resolve(symws: &dyn SymphonyService, record: TitleRecord) -> AppResult<ResolvedHoldings> {
    let Some(link) = parent_link(&record) else {
        return Ok(ResolvedHoldings {
            call_groups: record.call_groups,
            ..Default::default()
        });
    };

    let filter_call_number = Some(link.call_number.clone());
    let parent_id = Some(link.linked_title.id.clone()).filter(|id| !id.is_empty());
    let parent_title = parent_id.as_ref().map(|_| link.linked_title.title.clone());

    let call_groups = match parent_id.as_deref() {
        Some(id) => {
            tracing::info!("Title {} is bound with parent {}", record.id, id);
            symws.lookup_title_info(id).await?.call_groups
        }
        None => record.call_groups,
    };

    Ok(ResolvedHoldings {
        call_groups,
        filter_call_number,
        parent_id,
        parent_title,
    })
}
