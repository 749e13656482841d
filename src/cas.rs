pub mod model;
pub mod parse;
pub mod reader;
pub mod txtype;
pub mod value;
