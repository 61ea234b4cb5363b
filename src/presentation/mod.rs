//! 对决展示：时间轴、展示层接口与定时调度。

pub mod scheduler;
pub mod surface;
pub mod timeline;

pub use scheduler::{play_timeline, Generation, Scheduler, Task, VirtualClock};
pub use surface::{apply_step, AudioPlayer, PresentationSurface, RecordingSurface};
pub use timeline::{result_text, ResultStyle, Slot, SoundClip, TimedStep, Timeline, TimelineStep};
