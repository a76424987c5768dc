// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scoped ownership of arrays allocated by the native engine

use crate::error::{BridgeError, Result};
use crate::ffi::NativeApi;
use std::ffi::c_int;
use std::marker::PhantomData;
use tracing::{trace, warn};

/// Element types the native engine returns in arrays, each with its own
/// release entry point
pub trait NativeElement: Copy {
    const NAME: &'static str;

    /// # Safety
    /// `ptr` must be a live array allocated by the engine behind `api`.
    unsafe fn release(api: &NativeApi, ptr: *mut Self);
}

impl NativeElement for c_int {
    const NAME: &'static str = "int array";

    unsafe fn release(api: &NativeApi, ptr: *mut Self) {
        (api.release_int)(ptr, true)
    }
}

impl NativeElement for f64 {
    const NAME: &'static str = "double array";

    unsafe fn release(api: &NativeApi, ptr: *mut Self) {
        (api.release_double)(ptr, true)
    }
}

/// Native-allocated array released exactly once when the guard drops.
///
/// The guard is built immediately after the native call that produced the
/// pointer, before anything about the result is validated, so every exit path
/// (including validation errors) reaches the release call.
pub struct NativeArray<'a, T: NativeElement> {
    ptr: *mut T,
    len: usize,
    api: &'a NativeApi,
    _owns: PhantomData<T>,
}

impl<'a, T: NativeElement> NativeArray<'a, T> {
    /// Adopt an array of `count` items of `stride` elements each.
    ///
    /// # Safety
    /// `ptr` must be null or point to at least `count * stride` initialized
    /// elements allocated by the engine behind `api` and not yet released.
    pub unsafe fn adopt(api: &'a NativeApi, ptr: *mut T, count: c_int, stride: usize) -> Result<Self> {
        let mut guard = Self {
            ptr,
            len: 0,
            api,
            _owns: PhantomData,
        };

        let count = usize::try_from(count).map_err(|_| {
            warn!(count, kind = T::NAME, "native engine returned a negative count");
            BridgeError::NativeContract {
                what: T::NAME,
                detail: format!("negative count {}", count),
            }
        })?;
        if ptr.is_null() && count > 0 {
            warn!(count, kind = T::NAME, "native engine returned null with a non-zero count");
            return Err(BridgeError::NativeContract {
                what: T::NAME,
                detail: format!("null pointer with count {}", count),
            });
        }

        guard.len = count.checked_mul(stride).ok_or(BridgeError::NativeContract {
            what: T::NAME,
            detail: format!("count {} overflows the address space", count),
        })?;
        Ok(guard)
    }

    /// Number of elements (not items)
    pub fn len(&self) -> usize {
        if self.ptr.is_null() {
            0
        } else {
            self.len
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_slice(&self) -> &[T] {
        if self.is_empty() {
            return &[];
        }
        // SAFETY: non-null and `len` elements long per `adopt`; the array is
        // not released before `self` drops.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }

    /// Copy the contents into owned memory and release the native array
    pub fn into_vec(self) -> Vec<T> {
        self.as_slice().to_vec()
    }
}

impl<T: NativeElement> Drop for NativeArray<'_, T> {
    fn drop(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        trace!(kind = T::NAME, len = self.len, "releasing native array");
        // SAFETY: `ptr` came from the engine behind `api` and this is the only
        // release call issued for it.
        unsafe { T::release(self.api, self.ptr) };
    }
}
