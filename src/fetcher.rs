//! Genesis validator fetch
//!
//! Walks the paged listing from the first page until the continuation token
//! comes back empty. Pages are concatenated in server order; a failed request
//! aborts the whole fetch.

use crate::beacon::{ListValidatorsRequest, ValidatorRecord, ValidatorSource};
use crate::error::SyncResult;
use tracing::{debug, info};

/// Fetch every validator in the genesis set
pub async fn fetch_all(
    source: &dyn ValidatorSource,
    page_size: u32,
) -> SyncResult<Vec<ValidatorRecord>> {
    info!("Fetching all validators from genesis (page size {})", page_size);

    let mut req = ListValidatorsRequest {
        page_size,
        genesis: true,
        page_token: None,
    };

    let mut validators = Vec::new();
    let mut pages = 0usize;
    loop {
        let page = source.list_validators(&req).await?;
        pages += 1;
        debug!(
            "Page {}: {} validators (total so far {})",
            pages,
            page.records.len(),
            validators.len() + page.records.len()
        );

        validators.extend(page.records);

        if page.next_page_token.is_empty() {
            break;
        }
        req.page_token = Some(page.next_page_token);
    }

    info!(
        "Fetched {} validators in {} pages",
        validators.len(),
        pages
    );
    Ok(validators)
}
