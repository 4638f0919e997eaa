//! Sequence-number arithmetic over the modulo-(MAX_SEQ+1) wraparound space.

/// `(n + 1) mod (max_seq + 1)`.
pub fn inc(n: u8, max_seq: u8) -> u8 {
    if n == max_seq { 0 } else { n + 1 }
}

/// True iff `b` lies in the half-open circular arc `[a, c)`, travelling in
/// the direction of increasing sequence numbers with wraparound.
///
/// `between(a, a, c)` is true iff `a != c`; `between(a, c, c)` is always
/// false.
pub fn between(a: u8, b: u8, c: u8) -> bool {
    (a <= b && b < c) || (c < a && a <= b) || (b < c && c < a)
}

/// Length of the arc `[from, to)`, i.e. how many sequence numbers you pass
/// through stepping `inc` from `from` until reaching `to`.
pub fn arc_len(from: u8, to: u8, max_seq: u8) -> u8 {
    if to >= from { to - from } else { max_seq + 1 - from + to }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inc_wraps_at_max_seq() {
        assert_eq!(inc(6, 7), 7);
        assert_eq!(inc(7, 7), 0);
        assert_eq!(inc(0, 7), 1);
    }

    #[test]
    fn between_self_as_b() {
        // between(a, a, c) true iff a != c
        assert!(between(3, 3, 5));
        assert!(!between(3, 3, 3));
    }

    #[test]
    fn between_c_as_b() {
        // between(a, c, c) always false
        for a in 0..8u8 {
            for c in 0..8u8 {
                assert!(!between(a, c, c), "a={a} c={c}");
            }
        }
    }

    #[test]
    fn between_simple_arc() {
        assert!(between(1, 3, 5));
        assert!(!between(1, 5, 5));
        assert!(!between(1, 0, 5));
    }

    #[test]
    fn between_wraps_around() {
        // arc from 6 to 2 (mod 8) passes through 6, 7, 0, 1
        assert!(between(6, 7, 2));
        assert!(between(6, 0, 2));
        assert!(between(6, 1, 2));
        assert!(!between(6, 2, 2));
        assert!(!between(6, 3, 2));
        assert!(!between(6, 5, 2));
    }

    #[test]
    fn between_exhaustive_matches_rotation_formula() {
        let n: u16 = 8;
        for a in 0..n as u8 {
            for b in 0..n as u8 {
                for c in 0..n as u8 {
                    let rotated = ((b as i16 - a as i16).rem_euclid(n as i16))
                        < ((c as i16 - a as i16).rem_euclid(n as i16));
                    assert_eq!(between(a, b, c), rotated, "a={a} b={b} c={c}");
                }
            }
        }
    }

    #[test]
    fn arc_len_matches_between_membership() {
        let max_seq = 7u8;
        for from in 0..=max_seq {
            for to in 0..=max_seq {
                let len = arc_len(from, to, max_seq);
                let mut count = 0u8;
                let mut cur = from;
                while cur != to {
                    count += 1;
                    cur = inc(cur, max_seq);
                }
                assert_eq!(len, count, "from={from} to={to}");
            }
        }
    }
}
