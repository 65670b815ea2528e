//! Unset detection for `load` fields.
//!
//! A `load` field is only filled from the environment while it is vacant, so
//! a test author can pre-set it to override what ancestors saved.
//!
//! Smart pointers are vacant when their pointee is. A handle without an
//! unset value of its own, like `Arc<Mutex<T>>`, is loaded through
//! `Option<Arc<Mutex<T>>>`.

use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    sync::Arc,
};

pub trait Vacant {
    fn is_vacant(&self) -> bool;
}

macro_rules! impl_vacant_zero {
    ($($ty:ty => $zero:expr),* $(,)?) => {
        $(
            impl Vacant for $ty {
                fn is_vacant(&self) -> bool {
                    *self == $zero
                }
            }
        )*
    };
}

impl_vacant_zero!(
    u8 => 0, u16 => 0, u32 => 0, u64 => 0, u128 => 0, usize => 0,
    i8 => 0, i16 => 0, i32 => 0, i64 => 0, i128 => 0, isize => 0,
    f32 => 0.0, f64 => 0.0,
    bool => false,
    char => '\0',
);

impl Vacant for () {
    fn is_vacant(&self) -> bool {
        true
    }
}

impl Vacant for String {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl Vacant for &str {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Vacant for Option<T> {
    fn is_vacant(&self) -> bool {
        self.is_none()
    }
}

impl<T> Vacant for Vec<T> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Vacant for HashMap<K, V, S> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Vacant for BTreeMap<K, V> {
    fn is_vacant(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Vacant + ?Sized> Vacant for Box<T> {
    fn is_vacant(&self) -> bool {
        (**self).is_vacant()
    }
}

impl<T: Vacant + ?Sized> Vacant for Arc<T> {
    fn is_vacant(&self) -> bool {
        (**self).is_vacant()
    }
}
