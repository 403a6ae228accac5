//! `custom_debug` formatters that keep keyframe dumps readable.
//!
//! With the `trimmed-debug-output` feature enabled, long collections print
//! their first few elements followed by the number of elements left out.

use std::{cmp, fmt, rc, sync};

#[cfg(feature = "trimmed-debug-output")]
const FIRST_N_ELEMENTS: usize = 3;

pub trait HasLength {
    type Item: fmt::Debug;

    fn len2(&self) -> usize;
    fn get_first_n(&self, elements: usize) -> &[Self::Item];
}

impl<T: fmt::Debug> HasLength for [T] {
    type Item = T;
    fn len2(&self) -> usize {
        self.len()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        let end = cmp::min(elements, self.len());
        &self[..end]
    }
}

impl<T: fmt::Debug> HasLength for Vec<T> {
    type Item = T;
    fn len2(&self) -> usize {
        self.len()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        self.as_slice().get_first_n(elements)
    }
}

impl<T: ?Sized + HasLength> HasLength for Box<T> {
    type Item = T::Item;
    fn len2(&self) -> usize {
        self.as_ref().len2()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        self.as_ref().get_first_n(elements)
    }
}

impl<T: ?Sized + HasLength> HasLength for rc::Rc<T> {
    type Item = T::Item;
    fn len2(&self) -> usize {
        self.as_ref().len2()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        self.as_ref().get_first_n(elements)
    }
}

impl<T: ?Sized + HasLength> HasLength for sync::Arc<T> {
    type Item = T::Item;
    fn len2(&self) -> usize {
        self.as_ref().len2()
    }
    fn get_first_n(&self, elements: usize) -> &[Self::Item] {
        self.as_ref().get_first_n(elements)
    }
}

#[cfg(feature = "trimmed-debug-output")]
pub fn trimmed_collection_fmt<T: HasLength + fmt::Debug + ?Sized>(
    n: &T,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    let first = n.get_first_n(FIRST_N_ELEMENTS);
    let remaining = n.len2().saturating_sub(first.len());

    if remaining == 0 {
        write!(f, "{:#?}", n)
    } else {
        write!(f, "{:#?} + {} elements", first, remaining)
    }
}

#[cfg(not(feature = "trimmed-debug-output"))]
pub fn trimmed_collection_fmt<T: HasLength + fmt::Debug + ?Sized>(
    n: &T,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    write!(f, "{:#?}", n)
}

pub fn option_trimmed_collection_fmt<T: HasLength + fmt::Debug>(
    n: &Option<T>,
    f: &mut fmt::Formatter,
) -> fmt::Result {
    match n {
        Some(inner) => {
            write!(f, "Some(")?;
            trimmed_collection_fmt(inner, f)?;
            write!(f, ")")
        }
        None => write!(f, "None"),
    }
}
