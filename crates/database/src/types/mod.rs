pub mod errors;

pub type ListingResult<T> = Result<T, errors::ListingError>;
