//! Lucky draw engine for the classroom points tracker: winner selection,
//! the draw-session state machine, the rolling-display cadence and the
//! award callback contract. Rendering, sound output, real timers and
//! persistence stay with the embedding application behind small
//! capability traits.

mod audio;
mod avatar;
mod config;
mod error;
mod rolling;
mod roster;
mod scheduler;
mod selection;
mod session;

pub use audio::{AudioCue, NullAudio};
pub use avatar::{avatar_for, placeholder_for, AvatarRef, PlaceholderAvatar};
pub use config::DrawConfig;
pub use error::{ConfigError, DrawError};
pub use rolling::{ease_out_cubic, frame_interval, RollingSlot};
pub use roster::Student;
pub use scheduler::{ManualScheduler, TickScheduler, TimerHandle, TimerTick};
pub use selection::{draw_winners, draw_winners_with_rng, winner_indices_with_rng};
pub use session::{
    AwardRecord, DrawSession, Phase, SessionHooks, SessionSnapshot, SlotView, WinnerSelection,
};
