pub(crate) mod event_handlers;
pub(crate) mod music_manager;
pub(crate) mod player_state;
pub(crate) mod replies;
pub(crate) mod sequencer;
