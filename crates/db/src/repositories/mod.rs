pub mod batch_repo;
pub mod content_repo;
pub mod import_repo;
pub mod task_repo;

pub use batch_repo::BatchRepo;
pub use content_repo::{CollectionRepo, EntryRepo, TaxonomyRepo, TermRepo, UserRepo};
pub use import_repo::ImportRepo;
pub use task_repo::TaskRepo;
