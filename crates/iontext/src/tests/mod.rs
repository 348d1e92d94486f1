mod parse_good;
mod property_roundtrip;
mod symbol_tables;
