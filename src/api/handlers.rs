//! 路由处理器
//! 静态资源、授权码交换、以及需要认证的中继入口

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::core::{decompose_url, split_path_and_query, QueryParameters};
use crate::proxy::error::Result;
use crate::proxy::{resolve_target, transform, RelayError, RelayResponse};
use crate::state::AppState;

const TOKEN_COOKIE_PREFIX: &str = "token=";
const EXTRA_CODE_PARAM: &str = "extraCode";

/// 返回固定的本地资源文件
pub async fn serve_asset(State(state): State<Arc<AppState>>) -> Response {
    match tokio::fs::read(&state.config.asset_path).await {
        Ok(bytes) => (StatusCode::OK, bytes).into_response(),
        Err(e) => {
            tracing::error!("Failed to read asset {:?}: {}", state.config.asset_path, e);
            RelayError::Asset(e).render(state.config.debug_errors)
        }
    }
}

/// 一次性授权码换取会话 token，并写入 HttpOnly cookie
pub async fn auth(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    match exchange_code(&state, &uri).await {
        Ok(token) => {
            let cookie = format!("token={}; HttpOnly", urlencoding::encode(&token));
            ([(header::SET_COOKIE, cookie)], "Setting cookies").into_response()
        }
        Err(e) => {
            tracing::error!("Authorization code exchange failed: {}", e);
            e.render(state.config.debug_errors)
        }
    }
}

async fn exchange_code(state: &AppState, uri: &Uri) -> Result<String> {
    let (_, params) = split_path_and_query(&request_path(uri))?;
    let code = params.value("code").ok_or(RelayError::MissingCode)?;
    state.identity.exchange(code).await.map_err(RelayError::Provider)
}

/// 中继入口：校验 token 与身份，解析目标，请求源站并改写响应
pub async fn relay(State(state): State<Arc<AppState>>, uri: Uri, headers: HeaderMap) -> Response {
    match relay_request(&state, &uri, &headers).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            match &e {
                RelayError::AuthAmbiguous => {
                    tracing::warn!("Multiple token cookies on {}, rejecting", uri.path())
                }
                e if e.status().is_server_error() => {
                    tracing::error!("Relay of {} failed: {}", uri.path(), e)
                }
                e => tracing::info!("Relay of {} rejected: {}", uri.path(), e),
            }
            e.render(state.config.debug_errors)
        }
    }
}

async fn relay_request(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Result<RelayResponse> {
    let token = session_token(headers)?;

    let identity = state
        .identity
        .validate(&token)
        .await
        .map_err(RelayError::AuthInvalid)?;
    if identity.email != state.config.allowed_email {
        return Err(RelayError::Forbidden {
            email: identity.email,
        });
    }

    let path = request_path(uri);
    let (_, params) = split_path_and_query(&path)?;
    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok());

    let target = decompose_url(&resolve_target(&path, referer, &params)?);
    let origin = state.relay.fetch(&target).await?;

    tracing::info!(
        "Relayed {}{}{} -> {}",
        target.protocol,
        target.host,
        target.path,
        origin.status
    );

    Ok(transform(origin, extra_code(&params)))
}

fn extra_code(params: &QueryParameters) -> Option<&str> {
    params.value(EXTRA_CODE_PARAM)
}

/// Path plus query of the inbound request, also for absolute-form targets.
fn request_path(uri: &Uri) -> String {
    decompose_url(&uri.to_string()).path
}

/// 从所有 Cookie 头中取出唯一的 `token` 值并解码
fn session_token(headers: &HeaderMap) -> Result<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .map(str::trim)
        .filter(|c| c.starts_with(TOKEN_COOKIE_PREFIX))
        .collect();

    match values.as_slice() {
        [] => Err(RelayError::AuthMissing),
        [cookie] => Ok(crate::core::query::percent_decode(
            &cookie[TOKEN_COOKIE_PREFIX.len()..],
        )?),
        _ => Err(RelayError::AuthAmbiguous),
    }
}
