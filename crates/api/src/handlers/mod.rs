pub mod imports;
pub mod mappings;
