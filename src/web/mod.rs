//! 浏览器端的展示层、音效与定时器实现。

pub mod app;
pub mod audio;
pub mod dom;
pub mod scheduler;

pub use app::DuelApp;
pub use audio::WebAudio;
pub use dom::DomSurface;
pub use scheduler::TimeoutScheduler;
