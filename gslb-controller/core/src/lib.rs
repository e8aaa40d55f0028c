#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod filter;
mod hash;
mod key;
mod meta;

pub use self::{
    filter::Filter,
    hash::{bucket, checksum},
    key::{ChangeKey, Operation},
    meta::{Kind, Labels, ObjectMeta, ObjectRef, ObjectType},
};
