/// Checks that a numerical value lies in the interval `[a,b]` and returns early with
/// [`Error::InvalidParameter`](crate::error::Error::InvalidParameter) if not
///
/// Either end can be made exclusive by passing `open` for the lower or upper bound.
///
/// ### Example
/// ```ignore
/// let gamma = 1.0;
/// ensure_interval!(gamma, 0.0, 1.0, closed, open);
/// ```
/// This returns `Err` with the message "invalid value 1 for \`gamma\`, must be in the interval \[0, 1)".
macro_rules! ensure_interval {
    (@lo closed, $v:expr, $a:expr) => {
        ($v >= $a, '[')
    };
    (@lo open, $v:expr, $a:expr) => {
        ($v > $a, '(')
    };
    (@hi closed, $v:expr, $b:expr) => {
        ($v <= $b, ']')
    };
    (@hi open, $v:expr, $b:expr) => {
        ($v < $b, ')')
    };
    ($var:expr, $a:expr, $b:expr, $lo:ident, $hi:ident) => {{
        let value = $var;
        let (above, lo_bracket) = ensure_interval!(@lo $lo, value, $a);
        let (below, hi_bracket) = ensure_interval!(@hi $hi, value, $b);
        if !(above && below) {
            return Err($crate::error::Error::InvalidParameter {
                name: stringify!($var),
                value,
                interval: format!("{}{}, {}{}", lo_bracket, $a, $b, hi_bracket),
            });
        }
    }};
    ($var:expr, $a:expr, $b:expr) => {
        ensure_interval!($var, $a, $b, closed, closed)
    };
}

pub(crate) use ensure_interval;
