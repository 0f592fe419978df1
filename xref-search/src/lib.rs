//! Query interaction logic for the cross-reference search client.
//!
//! [`QueryController`] owns the full lifecycle of a search: input tracking,
//! suggestion visibility, submission, loading, and the terminal
//! success/failure states. The rendering layer reads [`QueryState`] and
//! calls the transition methods; it never mutates state directly.

mod controller;
mod debounce;
mod suggest;

pub use controller::MAX_QUERY_LEN;
pub use controller::QueryController;
pub use controller::QueryPhase;
pub use controller::QueryState;
pub use controller::SUGGESTION_DEBOUNCE;
pub use controller::SUGGESTION_REFRESH_DELAY;
pub use controller::SubmitTicket;
pub use debounce::Debouncer;
pub use suggest::MAX_SUGGESTIONS;
pub use suggest::filter_suggestions;
