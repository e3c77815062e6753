pub mod list;
pub mod navigate;
pub mod output;
pub mod progress;
pub mod settings;
pub mod start;
pub mod state;

pub use list::*;
pub use navigate::*;
pub use output::*;
pub use progress::*;
pub use settings::*;
pub use start::*;
pub use state::*;
