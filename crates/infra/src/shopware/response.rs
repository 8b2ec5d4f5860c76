use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use orderscan_scan::SourceError;

/// Map the status of a backend response, then decode its JSON body.
pub(crate) async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SourceError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))
}

async fn check_status(resp: Response) -> Result<Response, SourceError> {
    let status = resp.status();
    match status {
        StatusCode::UNAUTHORIZED => Err(SourceError::Unauthorized),
        StatusCode::NOT_FOUND => Err(SourceError::NotFound),
        s if s.is_success() => Ok(resp),
        s => Err(SourceError::UnexpectedStatus {
            status: s.as_u16(),
            body: resp.text().await.unwrap_or_default(),
        }),
    }
}

pub(crate) fn transport(err: reqwest::Error) -> SourceError {
    SourceError::Transport(err.to_string())
}
