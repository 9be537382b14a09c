// @generated
// This file wires up buf-generated protobuf code
// Note: The prost files already include!() the tonic files automatically

pub mod muopdb {
    include!("generated/muopdb/muopdb.rs");
    // muopdb.tonic.rs is auto-included by muopdb.rs
}
