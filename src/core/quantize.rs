//! Decimal price quantization
//!
//! Prices are published as fixed-point integers with 18 decimals. The last
//! six digits are always zeroed so that float-derived noise below 1e-12
//! never reaches the signed message.

use num_bigint::BigUint;
use rust_decimal::Decimal;

use crate::core::types::QuantizedPrice;
use crate::error::EncodingError;

/// Decimal places of a quantized price
pub const QUANTIZED_DECIMALS: u32 = 18;
/// Trailing digits forced to zero
const ZEROED_DIGITS: usize = 6;

/// Scale `price` by 10^18, truncate, then zero the last six digits
pub fn quantize_price(price: Decimal) -> Result<QuantizedPrice, EncodingError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(EncodingError::InvalidPrice(price.to_string()));
    }

    let mantissa = BigUint::from(price.mantissa().unsigned_abs());
    let scale = price.scale();
    let ten = BigUint::from(10u32);

    let scaled = if scale <= QUANTIZED_DECIMALS {
        mantissa * ten.pow(QUANTIZED_DECIMALS - scale)
    } else {
        mantissa / ten.pow(scale - QUANTIZED_DECIMALS)
    };

    Ok(stringify_quantized(&scaled))
}

fn stringify_quantized(value: &BigUint) -> QuantizedPrice {
    let digits = value.to_str_radix(10);
    if digits.len() > ZEROED_DIGITS {
        let kept = &digits[..digits.len() - ZEROED_DIGITS];
        QuantizedPrice::new(format!("{}{}", kept, "0".repeat(ZEROED_DIGITS)))
    } else {
        QuantizedPrice::new(digits)
    }
}
