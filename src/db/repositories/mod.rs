pub mod opens;

pub use opens::OpensRepository;
