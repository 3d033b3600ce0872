mod cache;
pub use cache::{FetchTicket, QueryCache, QueryData, QueryKey, Snapshot};

mod comment;
pub use comment::CommentNode;

mod error;
pub use error::Error;

mod feed;
pub use feed::{group_by_day, pretty_hostname, DayGroup, FeedOrder};

mod mutation;
pub use mutation::{LikeOutcome, Mutations, Outcome};

mod order;
pub use order::{Ranked, SortMode};

mod query;
pub use query::QueryClient;

mod remote;
pub use remote::{Api, HttpApi, LoginInfo};

mod render;
pub use render::{walk, CommentRow, Focus, RenderContext, RowKind, INDENT_STEP};

mod session;
pub use session::Session;

mod ui;
pub use ui::{Alert, AlertIcon, Alerts, Clipboard, ConfirmAction, Overlay, OverlayRequest};

pub mod api {
    pub use edge_api::*;
}
