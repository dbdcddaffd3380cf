use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../web/index.html");

/// The upload page: `#upload` file input, `#emitButton` and the output list.
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
