pub mod posts;
pub mod profile_detail;
pub mod profiles;
pub mod search;

pub use posts::PostsController;
pub use profile_detail::ProfileDetailController;
pub use profiles::ProfilesController;
pub use search::SearchController;
