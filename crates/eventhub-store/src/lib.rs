pub mod events;
pub mod organizations;
pub mod profiles;
pub mod seed;
pub mod students;

pub use events::InMemoryEventCatalog;
pub use organizations::InMemoryOrganizationIndex;
pub use profiles::InMemoryProfileStore;
pub use seed::{InMemoryStores, SeedData};
pub use students::StudentService;
