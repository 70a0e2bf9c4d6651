use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{SourceError, SourceResult};

/// Build the HTTP client shared by the remote providers.
pub(super) fn client() -> SourceResult<Client> {
    Client::builder()
        .user_agent(concat!("chat-trivia/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|source| SourceError::ClientBuilder { source })
}

/// GET `url` with `query` and decode the JSON body.
pub(super) async fn get_json<T>(
    client: &Client,
    url: &str,
    query: &[(&str, String)],
) -> SourceResult<T>
where
    T: DeserializeOwned,
{
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|source| SourceError::RequestSend {
            url: url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        return Err(SourceError::RequestStatus {
            url: url.to_string(),
            status: response.status(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|source| SourceError::DecodeResponse {
            url: url.to_string(),
            source,
        })
}
