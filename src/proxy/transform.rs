// 响应改写 - 去掉阻止嵌入的头部，可选地在 </body> 前注入代码
use axum::body::Body;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use super::upstream::RelayResponse;

const BODY_CLOSE: &[u8] = b"</body>";

/// The relay re-frames the body, so connection-level headers from the origin
/// must not leak through.
const HOP_BY_HOP: [&str; 5] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
];

/// 改写源站响应
///
/// 总是移除 `x-frame-options`。提供 `extra_code` 时：
/// - `content-length` 增加注入代码的字节数（原值无法解析时移除，由服务端重新计算）
/// - 设置 `x-xss-protection: 0`
/// - 在最后一个 `</body>` 之前插入代码，找不到时插入到开头
pub fn transform(mut response: RelayResponse, extra_code: Option<&str>) -> RelayResponse {
    response.headers.remove(header::X_FRAME_OPTIONS);
    for name in HOP_BY_HOP {
        response.headers.remove(name);
    }

    let Some(extra_code) = extra_code.filter(|code| !code.is_empty()) else {
        return response;
    };

    let content_length = response
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    match content_length {
        Some(length) => {
            let adjusted = length + extra_code.len() as u64;
            response
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(adjusted));
        }
        None => {
            response.headers.remove(header::CONTENT_LENGTH);
        }
    }
    response.headers.insert(
        HeaderName::from_static("x-xss-protection"),
        HeaderValue::from_static("0"),
    );

    let body = response.chunks.concat();
    let splice_at = rfind(&body, BODY_CLOSE).unwrap_or(0);

    let mut spliced = Vec::with_capacity(body.len() + extra_code.len());
    spliced.extend_from_slice(&body[..splice_at]);
    spliced.extend_from_slice(extra_code.as_bytes());
    spliced.extend_from_slice(&body[splice_at..]);
    response.chunks = vec![Bytes::from(spliced)];

    response
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).rposition(|window| window == needle)
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let body = match self.chunks.len() {
            0 => Bytes::new(),
            1 => self.chunks.into_iter().next().unwrap_or_default(),
            _ => Bytes::from(self.chunks.concat()),
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
