//! C ABI
//!
//! Every function returns an `i32` status (`SignerStatus`). Field elements,
//! keys and signature components cross the boundary as 32-byte big-endian
//! buffers. Outputs are written only when the call succeeds, except
//! `out_is_valid`, which is always reset to `0` first.
//!
//! After a non-zero status, `signer_last_error` returns a description of the
//! failure on the calling thread. A successful call clears it.
//!
//! # Safety
//!
//! Pointer arguments must be null or point to live buffers of the stated
//! size. Output buffers must not overlap inputs or each other. String
//! arguments must be NUL-terminated.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use tracing::warn;

use crate::core::types::QuantizedPrice;
use crate::error::{SignError, ValidateError};
use crate::stark::{self, FieldBytes, MessageInputs, PrivateKey, PublicKey};

/// Status codes shared with C callers
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerStatus {
    Ok = 0,
    InvalidKey = 1,
    InvalidInput = 2,
    InvalidSignature = 3,
    InvalidPublicKey = 4,
    InternalError = 5,
    NullPointer = 6,
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

struct FfiFailure {
    status: SignerStatus,
    message: String,
}

impl FfiFailure {
    fn null(name: &str) -> Self {
        Self {
            status: SignerStatus::NullPointer,
            message: format!("{} is null", name),
        }
    }
}

impl From<SignError> for FfiFailure {
    fn from(err: SignError) -> Self {
        let status = match err {
            SignError::InvalidKey(_) => SignerStatus::InvalidKey,
            SignError::InvalidInput(_) => SignerStatus::InvalidInput,
            SignError::InternalError(_) => SignerStatus::InternalError,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<ValidateError> for FfiFailure {
    fn from(err: ValidateError) -> Self {
        let status = match err {
            ValidateError::InvalidInput(_) => SignerStatus::InvalidInput,
            ValidateError::InvalidSignature(_) => SignerStatus::InvalidSignature,
            ValidateError::InvalidPublicKey(_) => SignerStatus::InvalidPublicKey,
            ValidateError::InternalError(_) => SignerStatus::InternalError,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn set_last_error(message: Option<String>) {
    // Interior NULs cannot appear in a C string
    let message = message.map(|m| CString::new(m.replace('\0', " ")).unwrap_or_default());
    LAST_ERROR.with(|slot| *slot.borrow_mut() = message);
}

/// Run `op`, translating errors and panics into a status code
fn guard<F>(op: F) -> i32
where
    F: FnOnce() -> Result<(), FfiFailure>,
{
    let failure = match catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(())) => {
            set_last_error(None);
            return SignerStatus::Ok as i32;
        }
        Ok(Err(failure)) => failure,
        Err(_) => FfiFailure {
            status: SignerStatus::InternalError,
            message: "panic inside signer".to_string(),
        },
    };

    warn!(status = ?failure.status, error = %failure.message, "FFI call failed");
    let status = failure.status as i32;
    set_last_error(Some(failure.message));
    status
}

fn required<T>(value: Option<T>, name: &str) -> Result<T, FfiFailure> {
    value.ok_or_else(|| FfiFailure::null(name))
}

/// # Safety
/// `ptr` must be null or a NUL-terminated string valid for `'a`.
unsafe fn c_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, FfiFailure> {
    if ptr.is_null() {
        return Err(FfiFailure::null(name));
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| FfiFailure {
        status: SignerStatus::InvalidInput,
        message: format!("{} is not valid UTF-8", name),
    })
}

/// # Safety
/// All string pointers must be null or NUL-terminated.
unsafe fn price_inputs(
    asset: *const c_char,
    quantized_price: *const c_char,
    timestamp_ns: i64,
    oracle_name: *const c_char,
) -> Result<MessageInputs, FfiFailure> {
    Ok(MessageInputs::price(
        c_str(asset, "asset")?,
        QuantizedPrice::new(c_str(quantized_price, "quantized_price")?),
        timestamp_ns,
        c_str(oracle_name, "oracle_name")?,
    ))
}

fn sign_into(
    inputs: Result<MessageInputs, FfiFailure>,
    private_key: Option<&FieldBytes>,
    out_hash: Option<&mut FieldBytes>,
    out_r: Option<&mut FieldBytes>,
    out_s: Option<&mut FieldBytes>,
) -> Result<(), FfiFailure> {
    let private_key = required(private_key, "private_key")?;
    let out_hash = required(out_hash, "out_hash")?;
    let out_r = required(out_r, "out_r")?;
    let out_s = required(out_s, "out_s")?;

    let key = PrivateKey::from_bytes(private_key)?;
    let attestation = stark::hash_and_sign(&inputs?, &key)?;

    *out_hash = attestation.hash_bytes();
    *out_r = attestation.r_bytes();
    *out_s = attestation.s_bytes();
    Ok(())
}

fn validate_into(
    inputs: Result<MessageInputs, FfiFailure>,
    public_key: Option<&FieldBytes>,
    r: Option<&FieldBytes>,
    s: Option<&FieldBytes>,
    out_is_valid: &mut u8,
) -> Result<(), FfiFailure> {
    let public_key = required(public_key, "public_key")?;
    let r = required(r, "r")?;
    let s = required(s, "s")?;

    let valid = stark::validate_signature_bytes(&inputs?, public_key, r, s)?;
    *out_is_valid = u8::from(valid);
    Ok(())
}

// ============================================================================
// Exported functions
// ============================================================================

/// Sign pre-encoded `(x, y)`
///
/// # Safety
/// See the module documentation.
#[no_mangle]
pub unsafe extern "C" fn hash_and_sign(
    x: Option<&FieldBytes>,
    y: Option<&FieldBytes>,
    private_key: Option<&FieldBytes>,
    out_hash: Option<&mut FieldBytes>,
    out_r: Option<&mut FieldBytes>,
    out_s: Option<&mut FieldBytes>,
) -> i32 {
    guard(|| {
        let inputs = match (x, y) {
            (Some(x), Some(y)) => MessageInputs::from_bytes(x, y)
                .map_err(|e| FfiFailure::from(SignError::from(e))),
            (None, _) => Err(FfiFailure::null("x")),
            (_, None) => Err(FfiFailure::null("y")),
        };
        sign_into(inputs, private_key, out_hash, out_r, out_s)
    })
}

/// Encode a price observation, then sign it
///
/// # Safety
/// See the module documentation.
#[no_mangle]
pub unsafe extern "C" fn hash_and_sign_price(
    asset: *const c_char,
    quantized_price: *const c_char,
    timestamp_ns: i64,
    oracle_name: *const c_char,
    private_key: Option<&FieldBytes>,
    out_hash: Option<&mut FieldBytes>,
    out_r: Option<&mut FieldBytes>,
    out_s: Option<&mut FieldBytes>,
) -> i32 {
    guard(|| {
        let inputs = price_inputs(asset, quantized_price, timestamp_ns, oracle_name);
        sign_into(inputs, private_key, out_hash, out_r, out_s)
    })
}

/// Check a signature over pre-encoded `(x, y)`
///
/// `*out_is_valid` is `1` only when the status is `0` and the signature matches.
///
/// # Safety
/// See the module documentation.
#[no_mangle]
pub unsafe extern "C" fn validate_stark_signature(
    x: Option<&FieldBytes>,
    y: Option<&FieldBytes>,
    public_key: Option<&FieldBytes>,
    r: Option<&FieldBytes>,
    s: Option<&FieldBytes>,
    out_is_valid: Option<&mut u8>,
) -> i32 {
    guard(|| {
        let out_is_valid = required(out_is_valid, "out_is_valid")?;
        *out_is_valid = 0;
        let inputs = match (x, y) {
            (Some(x), Some(y)) => MessageInputs::from_bytes(x, y)
                .map_err(|e| FfiFailure::from(ValidateError::from(e))),
            (None, _) => Err(FfiFailure::null("x")),
            (_, None) => Err(FfiFailure::null("y")),
        };
        validate_into(inputs, public_key, r, s, out_is_valid)
    })
}

/// Check a signature over a price observation
///
/// # Safety
/// See the module documentation.
#[no_mangle]
pub unsafe extern "C" fn validate_price_signature(
    asset: *const c_char,
    quantized_price: *const c_char,
    timestamp_ns: i64,
    oracle_name: *const c_char,
    public_key: Option<&FieldBytes>,
    r: Option<&FieldBytes>,
    s: Option<&FieldBytes>,
    out_is_valid: Option<&mut u8>,
) -> i32 {
    guard(|| {
        let out_is_valid = required(out_is_valid, "out_is_valid")?;
        *out_is_valid = 0;
        let inputs = price_inputs(asset, quantized_price, timestamp_ns, oracle_name);
        validate_into(inputs, public_key, r, s, out_is_valid)
    })
}

/// Derive the public key (x-coordinate) of a private key
///
/// # Safety
/// See the module documentation.
#[no_mangle]
pub unsafe extern "C" fn public_key_from_private(
    private_key: Option<&FieldBytes>,
    out_public_key: Option<&mut FieldBytes>,
) -> i32 {
    guard(|| {
        let private_key = required(private_key, "private_key")?;
        let out_public_key = required(out_public_key, "out_public_key")?;
        let public_key: PublicKey = PrivateKey::from_bytes(private_key)?.public_key()?;
        *out_public_key = public_key.to_bytes();
        Ok(())
    })
}

/// Description of the last failure on this thread, or null
///
/// The returned string must be released with `signer_free_string`.
#[no_mangle]
pub extern "C" fn signer_last_error() -> *mut c_char {
    LAST_ERROR.with(|slot| match slot.borrow().as_ref() {
        Some(message) => message.clone().into_raw(),
        None => ptr::null_mut(),
    })
}

/// Release a string returned by `signer_last_error`
///
/// # Safety
/// `ptr` must be null or a pointer obtained from `signer_last_error` that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn signer_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stark::field::parse_hex_bytes;

    const TEST_PRIVATE_KEY: &str = "0x66253bdeb3c1a235cf4376611e3a14474e2c00fd2fb225f9a388faae7fb095a";
    const TEST_PUBLIC_KEY: &str = "0x418d3fd8219a2cf32a00d458f61802d17f01c5bcde5a4f82008ee4a7c8e9a06";
    const TEST_X: &str = "0x44594458555344000000000000000000637a6f7778";
    const TEST_Y: &str = "0x2e4bad2b28effe0065dc5d21";

    fn bytes(hex: &str) -> FieldBytes {
        parse_hex_bytes(hex, "test").unwrap()
    }

    fn last_error() -> Option<String> {
        let ptr = signer_last_error();
        if ptr.is_null() {
            return None;
        }
        let message = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        unsafe { signer_free_string(ptr) };
        Some(message)
    }

    #[test]
    fn test_hash_and_sign_reference_vector() {
        let (x, y, pk) = (bytes(TEST_X), bytes(TEST_Y), bytes(TEST_PRIVATE_KEY));
        let (mut hash, mut r, mut s) = ([0u8; 32], [0u8; 32], [0u8; 32]);

        let status = unsafe {
            hash_and_sign(Some(&x), Some(&y), Some(&pk), Some(&mut hash), Some(&mut r), Some(&mut s))
        };

        assert_eq!(status, SignerStatus::Ok as i32);
        assert_eq!(hash, bytes("0x7cc1cf795d076cfff8b5920adb2dcc0d13813ed4519220a36d693e6084abe1c"));
        assert_eq!(r, bytes("0x60bbbb4142bca69a5278ecccb59964e3449e43915b02e5c729b9752a16309ac"));
        assert_eq!(s, bytes("0x4cdbe54b985f6fb4495398f94554883ead7cbb983597dc7ea8b9e32dfe95c27"));
        assert_eq!(last_error(), None);
    }

    #[test]
    fn test_price_variants_round_trip() {
        let asset = CString::new("DYDXUSD").unwrap();
        let price = CString::new("3335950349880000000").unwrap();
        let oracle = CString::new("czowx").unwrap();
        let pk = bytes(TEST_PRIVATE_KEY);
        let public_key = bytes(TEST_PUBLIC_KEY);
        let (mut hash, mut r, mut s) = ([0u8; 32], [0u8; 32], [0u8; 32]);

        let status = unsafe {
            hash_and_sign_price(
                asset.as_ptr(),
                price.as_ptr(),
                1708940577123456789,
                oracle.as_ptr(),
                Some(&pk),
                Some(&mut hash),
                Some(&mut r),
                Some(&mut s),
            )
        };
        assert_eq!(status, 0);
        assert_eq!(r, bytes("0x60bbbb4142bca69a5278ecccb59964e3449e43915b02e5c729b9752a16309ac"));

        let mut valid = 0u8;
        let status = unsafe {
            validate_price_signature(
                asset.as_ptr(),
                price.as_ptr(),
                1708940577123456789,
                oracle.as_ptr(),
                Some(&public_key),
                Some(&r),
                Some(&s),
                Some(&mut valid),
            )
        };
        assert_eq!(status, 0);
        assert_eq!(valid, 1);
    }

    #[test]
    fn test_validate_mismatch_is_ok_status_with_false() {
        let (x, public_key) = (bytes(TEST_X), bytes(TEST_PUBLIC_KEY));
        let other_y = bytes("0x2e4bad2b28effe0065dc5d22");
        let r = bytes("0x60bbbb4142bca69a5278ecccb59964e3449e43915b02e5c729b9752a16309ac");
        let s = bytes("0x4cdbe54b985f6fb4495398f94554883ead7cbb983597dc7ea8b9e32dfe95c27");
        let mut valid = 1u8;

        let status = unsafe {
            validate_stark_signature(
                Some(&x),
                Some(&other_y),
                Some(&public_key),
                Some(&r),
                Some(&s),
                Some(&mut valid),
            )
        };
        assert_eq!(status, SignerStatus::Ok as i32);
        assert_eq!(valid, 0);
    }

    #[test]
    fn test_validate_error_never_reports_valid() {
        let (x, y) = (bytes(TEST_X), bytes(TEST_Y));
        let off_curve = bytes("0x5");
        let r = bytes("0x60bbbb4142bca69a5278ecccb59964e3449e43915b02e5c729b9752a16309ac");
        let s = bytes("0x4cdbe54b985f6fb4495398f94554883ead7cbb983597dc7ea8b9e32dfe95c27");
        let mut valid = 1u8;

        let status = unsafe {
            validate_stark_signature(
                Some(&x),
                Some(&y),
                Some(&off_curve),
                Some(&r),
                Some(&s),
                Some(&mut valid),
            )
        };
        assert_eq!(status, SignerStatus::InvalidPublicKey as i32);
        assert_eq!(valid, 0);
        assert!(last_error().unwrap().contains("invalid public key"));
    }

    #[test]
    fn test_zero_signature_component() {
        let (x, y, public_key) = (bytes(TEST_X), bytes(TEST_Y), bytes(TEST_PUBLIC_KEY));
        let zero = [0u8; 32];
        let mut valid = 0u8;
        let status = unsafe {
            validate_stark_signature(
                Some(&x),
                Some(&y),
                Some(&public_key),
                Some(&zero),
                Some(&zero),
                Some(&mut valid),
            )
        };
        assert_eq!(status, SignerStatus::InvalidSignature as i32);
    }

    #[test]
    fn test_invalid_key_leaves_outputs_untouched() {
        let (x, y) = (bytes(TEST_X), bytes(TEST_Y));
        let zero_key = [0u8; 32];
        let (mut hash, mut r, mut s) = ([7u8; 32], [7u8; 32], [7u8; 32]);

        let status = unsafe {
            hash_and_sign(Some(&x), Some(&y), Some(&zero_key), Some(&mut hash), Some(&mut r), Some(&mut s))
        };
        assert_eq!(status, SignerStatus::InvalidKey as i32);
        assert_eq!(hash, [7u8; 32]);
        assert_eq!(r, [7u8; 32]);
        assert!(last_error().unwrap().contains("invalid private key"));
    }

    #[test]
    fn test_out_of_field_input() {
        let x = [0xffu8; 32];
        let (y, pk) = (bytes(TEST_Y), bytes(TEST_PRIVATE_KEY));
        let (mut hash, mut r, mut s) = ([0u8; 32], [0u8; 32], [0u8; 32]);
        let status = unsafe {
            hash_and_sign(Some(&x), Some(&y), Some(&pk), Some(&mut hash), Some(&mut r), Some(&mut s))
        };
        assert_eq!(status, SignerStatus::InvalidInput as i32);
    }

    #[test]
    fn test_null_pointers() {
        let (x, pk) = (bytes(TEST_X), bytes(TEST_PRIVATE_KEY));
        let (mut hash, mut r, mut s) = ([0u8; 32], [0u8; 32], [0u8; 32]);
        let status = unsafe {
            hash_and_sign(Some(&x), None, Some(&pk), Some(&mut hash), Some(&mut r), Some(&mut s))
        };
        assert_eq!(status, SignerStatus::NullPointer as i32);
        assert_eq!(last_error().as_deref(), Some("y is null"));

        let status = unsafe {
            hash_and_sign_price(
                ptr::null(),
                ptr::null(),
                0,
                ptr::null(),
                Some(&pk),
                Some(&mut hash),
                Some(&mut r),
                Some(&mut s),
            )
        };
        assert_eq!(status, SignerStatus::NullPointer as i32);
    }

    #[test]
    fn test_public_key_from_private() {
        let pk = bytes(TEST_PRIVATE_KEY);
        let mut out = [0u8; 32];
        let status = unsafe { public_key_from_private(Some(&pk), Some(&mut out)) };
        assert_eq!(status, 0);
        assert_eq!(out, bytes(TEST_PUBLIC_KEY));
    }

    #[test]
    fn test_last_error_cleared_by_success() {
        let mut out = [0u8; 32];
        let status = unsafe { public_key_from_private(None, Some(&mut out)) };
        assert_eq!(status, SignerStatus::NullPointer as i32);
        assert!(last_error().is_some());

        let pk = bytes(TEST_PRIVATE_KEY);
        let status = unsafe { public_key_from_private(Some(&pk), Some(&mut out)) };
        assert_eq!(status, 0);
        assert_eq!(last_error(), None);
    }

    #[test]
    fn test_free_null_is_noop() {
        unsafe { signer_free_string(ptr::null_mut()) };
    }
}
