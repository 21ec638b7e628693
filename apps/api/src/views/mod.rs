//! Askama view models. Handlers build these; templates under `templates/` render them.

pub mod pages;
pub mod portfolio;
pub mod render;

pub use pages::{AuthErrorView, DashboardView, ErrorView, LandingView, SignInView, UnavailableView};
pub use portfolio::{render_portfolio, PortfolioView};
pub use render::{render_template, render_with_status};
