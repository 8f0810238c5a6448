//! Voice-channel music playback commands and their supporting machinery.

pub(crate) mod back;
pub(crate) mod join;
pub(crate) mod leave;
pub(crate) mod next;
pub(crate) mod pause;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod resume;
pub(crate) mod stop;

pub(crate) mod audio_sources;
pub(crate) mod utils;

use crate::{CommandResult, Context};
