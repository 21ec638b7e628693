use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::views::ErrorView;

/// Renders a template, falling back to the error page when rendering fails.
pub fn render_template<T: Template>(template: T) -> Response {
    render_with_status(StatusCode::OK, template)
}

pub fn render_with_status<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            render_error(StatusCode::INTERNAL_SERVER_ERROR, "The page could not be rendered")
        }
    }
}

/// Renders the error page, or plain text if even that fails.
pub fn render_error(status: StatusCode, message: &str) -> Response {
    match ErrorView::new(message).render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error view: {}", e);
            (status, message.to_string()).into_response()
        }
    }
}
