//! **bhavna**: send a piece of text to an emotion classifier and chart what
//! comes back.
//!
//! | Module | Role |
//! |--------|------|
//! | [`input_guard`] | Length checks and the character counter |
//! | [`transport`] | [`Analyzer`] trait and the reqwest-backed [`HttpAnalyzer`] |
//! | [`analysis`] | Request, result and health wire types |
//! | [`renderer`] | Result to glyph, label, percentages and chart series |
//! | [`chart`] | [`ChartPresenter`](chart::ChartPresenter): the single live chart |
//! | [`session`] | [`Session`] model: UI state machine and key handling |
//! | [`config`] | [`ClientConfig`] |
//! | [`error`] | Failure taxonomy and banner text |
//! | [`logging`] | File-backed `tracing` setup |

pub mod analysis;
pub mod chart;
pub mod config;
pub mod error;
pub mod input_guard;
pub mod logging;
pub mod renderer;
pub mod session;
pub mod transport;
mod view;

pub use analysis::{AnalysisRequest, AnalysisResult, BackendStatus, Scores};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::{AnalysisError, ConfigError, TransportError, ValidationError};
pub use session::{Session, SessionFlags, UiState};
pub use transport::{Analyzer, HttpAnalyzer};
