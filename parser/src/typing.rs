//! Type compatibility, promotion and array-size reconciliation.
//!
//! Every function here is pure: the resolved type and size of an expression
//! is a deterministic function of its sub-expressions' types and sizes.
use pasc_dsl::symbol::DataType;

/// A conversion the code generator must insert to make a value match the
/// type the context expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    IntToBool,
    BoolToInt,
    IntToFloat,
    FloatToInt,
}

/// Whether a value of type `src` may be assigned, returned or passed where
/// type `dest` is expected.
///
/// Exact matches are always compatible. Strings are compatible only with
/// strings. Bool and Integer convert both ways, as do Integer and Float;
/// Bool and Float do not convert directly.
pub fn assign_compatible(dest: DataType, src: DataType) -> bool {
    if dest == src {
        return true;
    }
    matches!(
        (dest, src),
        (DataType::Bool, DataType::Integer)
            | (DataType::Integer, DataType::Bool)
            | (DataType::Integer, DataType::Float)
            | (DataType::Float, DataType::Integer)
    )
}

/// The conversion needed to take a value of type `src` to type `dest`, or
/// `None` when the types already match. Only call for compatible pairs.
pub fn conversion(dest: DataType, src: DataType) -> Option<Conversion> {
    match (dest, src) {
        (DataType::Bool, DataType::Integer) => Some(Conversion::IntToBool),
        (DataType::Integer, DataType::Bool) => Some(Conversion::BoolToInt),
        (DataType::Integer, DataType::Float) => Some(Conversion::FloatToInt),
        (DataType::Float, DataType::Integer) => Some(Conversion::IntToFloat),
        _ => None,
    }
}

/// The result type of `+ - * /` over the operand types, or `None` when an
/// operand is not numeric. Float wins over Integer.
pub fn arithmetic_result(left: DataType, right: DataType) -> Option<DataType> {
    if !left.is_numeric() || !right.is_numeric() {
        return None;
    }
    if left == DataType::Float || right == DataType::Float {
        Some(DataType::Float)
    } else {
        Some(DataType::Integer)
    }
}

/// The common operand type a comparison is performed at, with the
/// conversion (if any) for each side. `None` when the operands cannot be
/// compared: String pairs only with String, and Bool with Float has no
/// direct conversion.
pub fn comparison_operands(
    left: DataType,
    right: DataType,
) -> Option<(DataType, Option<Conversion>, Option<Conversion>)> {
    if left == right {
        return Some((left, None, None));
    }
    let common = match (left, right) {
        (DataType::Bool, DataType::Integer) | (DataType::Integer, DataType::Bool) => {
            DataType::Integer
        }
        (DataType::Integer, DataType::Float) | (DataType::Float, DataType::Integer) => {
            DataType::Float
        }
        _ => return None,
    };
    Some((common, conversion(common, left), conversion(common, right)))
}

/// Reconciles the array sizes of two operands; scalar is size 0.
///
/// Two non-zero sizes must be equal. When exactly one operand is an array
/// the scalar broadcasts across it and the result keeps the array size.
/// `None` means the sizes cannot be reconciled.
pub fn reconcile_sizes(left: u32, right: u32) -> Option<u32> {
    if left == 0 || right == 0 {
        Some(left.max(right))
    } else if left == right {
        Some(left)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DataType::*;

    const ALL: [DataType; 4] = [Integer, Float, Bool, String];

    #[test]
    fn assign_compatible_when_same_type_then_true() {
        for data_type in ALL {
            assert!(assign_compatible(data_type, data_type));
        }
    }

    #[test]
    fn assign_compatible_when_all_pairs_then_matches_table() {
        // The full 4x4 matrix: string only with string, bool<->integer,
        // integer<->float, and nothing else.
        for dest in ALL {
            for src in ALL {
                let expected = dest == src
                    || matches!(
                        (dest, src),
                        (Bool, Integer) | (Integer, Bool) | (Integer, Float) | (Float, Integer)
                    );
                assert_eq!(
                    assign_compatible(dest, src),
                    expected,
                    "dest={:?} src={:?}",
                    dest,
                    src
                );
            }
        }
    }

    #[test]
    fn assign_compatible_when_convertible_pairs_then_symmetric() {
        assert_eq!(
            assign_compatible(Bool, Integer),
            assign_compatible(Integer, Bool)
        );
        assert_eq!(
            assign_compatible(Integer, Float),
            assign_compatible(Float, Integer)
        );
    }

    #[test]
    fn assign_compatible_when_bool_and_float_then_false() {
        assert!(!assign_compatible(Bool, Float));
        assert!(!assign_compatible(Float, Bool));
    }

    #[test]
    fn conversion_when_types_match_then_none() {
        for data_type in ALL {
            assert_eq!(conversion(data_type, data_type), None);
        }
    }

    #[test]
    fn conversion_when_convertible_then_directed() {
        assert_eq!(conversion(Bool, Integer), Some(Conversion::IntToBool));
        assert_eq!(conversion(Integer, Bool), Some(Conversion::BoolToInt));
        assert_eq!(conversion(Integer, Float), Some(Conversion::FloatToInt));
        assert_eq!(conversion(Float, Integer), Some(Conversion::IntToFloat));
    }

    #[test]
    fn arithmetic_result_when_floats_involved_then_float() {
        assert_eq!(arithmetic_result(Integer, Integer), Some(Integer));
        assert_eq!(arithmetic_result(Integer, Float), Some(Float));
        assert_eq!(arithmetic_result(Float, Integer), Some(Float));
        assert_eq!(arithmetic_result(Float, Float), Some(Float));
    }

    #[test]
    fn arithmetic_result_when_not_numeric_then_none() {
        assert_eq!(arithmetic_result(Bool, Integer), None);
        assert_eq!(arithmetic_result(Integer, String), None);
        assert_eq!(arithmetic_result(String, String), None);
    }

    #[test]
    fn comparison_operands_when_mixed_numeric_then_promotes() {
        assert_eq!(comparison_operands(Integer, Integer), Some((Integer, None, None)));
        assert_eq!(
            comparison_operands(Integer, Float),
            Some((Float, Some(Conversion::IntToFloat), None))
        );
        assert_eq!(
            comparison_operands(Bool, Integer),
            Some((Integer, Some(Conversion::BoolToInt), None))
        );
    }

    #[test]
    fn comparison_operands_when_string_with_other_then_none() {
        for other in [Integer, Float, Bool] {
            assert_eq!(comparison_operands(String, other), None);
            assert_eq!(comparison_operands(other, String), None);
        }
        assert_eq!(comparison_operands(String, String), Some((String, None, None)));
    }

    #[test]
    fn comparison_operands_when_bool_and_float_then_none() {
        assert_eq!(comparison_operands(Bool, Float), None);
        assert_eq!(comparison_operands(Float, Bool), None);
    }

    #[test]
    fn reconcile_sizes_when_representative_sizes_then_matches_matrix() {
        // The broadcast rule over sizes {0, 1, 3, 5}.
        assert_eq!(reconcile_sizes(0, 0), Some(0));
        assert_eq!(reconcile_sizes(0, 1), Some(1));
        assert_eq!(reconcile_sizes(1, 0), Some(1));
        assert_eq!(reconcile_sizes(0, 3), Some(3));
        assert_eq!(reconcile_sizes(3, 0), Some(3));
        assert_eq!(reconcile_sizes(3, 3), Some(3));
        assert_eq!(reconcile_sizes(5, 5), Some(5));
        assert_eq!(reconcile_sizes(3, 5), None);
        assert_eq!(reconcile_sizes(5, 3), None);
        assert_eq!(reconcile_sizes(1, 3), None);
    }
}
