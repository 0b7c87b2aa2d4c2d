pub mod decode;
pub mod extract;
pub mod numeric;
pub mod ocr;
pub mod query;
