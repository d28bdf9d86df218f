//! Walking paginated listing endpoints.
use async_stream::try_stream;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::decode;
use crate::{Client, RequestDescription, Result};

/// Fetch every page of a listing, one response body per page.
///
/// Pages are requested one after another starting at 1, with `query` plus a
/// `page` parameter. The stream ends after the page whose `total_pages` is
/// not greater than its own number, so a body without `total_pages` ends it
/// after the first page. Each page is an ordinary governed call.
pub fn paginate<'a>(
    client: &'a Client,
    path: impl Into<String>,
    query: Vec<(String, String)>,
) -> impl Stream<Item = Result<Value>> + 'a {
    let path = path.into();
    try_stream! {
        let mut page: u64 = 0;
        loop {
            page += 1;
            let description = RequestDescription::get(path.clone())
                .with_query(query.iter().cloned())
                .with_query([("page", page.to_string())]);

            let response = client.execute(description).await?;
            let total_pages = response
                .get("total_pages")
                .and_then(Value::as_u64)
                .unwrap_or_default();

            yield response;

            if total_pages <= page {
                break;
            }
        }
    }
}

/// Fetch every page of a listing and collect the array found under `key`
/// in each page.
///
/// # Errors
///
/// Returns the first error of any page request, or
/// [`crate::ErrorKind::UnexpectedPayload`] if an item does not decode into `T`.
pub async fn collect_all<T: DeserializeOwned>(
    client: &Client,
    path: impl Into<String>,
    query: Vec<(String, String)>,
    key: &str,
) -> Result<Vec<T>> {
    let pages = paginate(client, path, query);
    tokio::pin!(pages);

    let mut items = Vec::new();
    while let Some(mut page) = pages.try_next().await? {
        if let Some(list) = page.get_mut(key).map(Value::take) {
            items.extend(decode::<Vec<T>>(list)?);
        }
    }
    Ok(items)
}
