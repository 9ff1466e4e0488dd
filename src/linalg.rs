/// Basis of the right kernel of a GF(2) matrix given as bit rows.
///
/// Each row occupies the low `width` bits of a u64. Returned vectors x
/// satisfy parity(row & x) == 0 for every input row.
pub fn kernel_basis(rows: &[u64], width: u32) -> Vec<u64> {
    debug_assert!(width >= 1 && width <= 64);
    let mask = if width == 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    };
    // reduced row echelon form, pivot on the highest set bit
    let mut pivots: Vec<(u32, u64)> = Vec::new();
    for &orig in rows {
        let mut r = orig & mask;
        for &(p, row) in &pivots {
            if (r >> p) & 1 == 1 {
                r ^= row;
            }
        }
        if r != 0 {
            let p = 63 - r.leading_zeros();
            for (_, row) in pivots.iter_mut() {
                if (*row >> p) & 1 == 1 {
                    *row ^= r;
                }
            }
            pivots.push((p, r));
        }
    }
    let pivot_mask: u64 = pivots.iter().fold(0, |m, &(p, _)| m | (1u64 << p));
    let mut basis = Vec::with_capacity(width as usize - pivots.len());
    for c in (0..width).rev() {
        if (pivot_mask >> c) & 1 == 1 {
            continue;
        }
        let mut v = 1u64 << c;
        for &(p, row) in &pivots {
            if (row >> c) & 1 == 1 {
                v |= 1u64 << p;
            }
        }
        basis.push(v);
    }
    basis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orthogonal(rows: &[u64], v: u64) -> bool {
        rows.iter().all(|&r| (r & v).count_ones() % 2 == 0)
    }

    #[test]
    pub fn run_tests() {
        // full-rank 3x3 identity has a trivial kernel
        assert!(kernel_basis(&[0b100, 0b010, 0b001], 3).is_empty());
        // single row 101 over width 3: kernel has dimension 2
        let rows = [0b101u64];
        let basis = kernel_basis(&rows, 3);
        assert_eq!(basis.len(), 2);
        for &v in &basis {
            assert!(v != 0);
            assert!(orthogonal(&rows, v));
        }
        // dependent rows do not shrink the kernel
        let rows = [0b1100u64, 0b0110, 0b1010];
        let basis = kernel_basis(&rows, 4);
        assert_eq!(basis.len(), 2);
        for &v in &basis {
            assert!(orthogonal(&rows, v));
        }
        // empty matrix: the whole space
        assert_eq!(kernel_basis(&[], 4).len(), 4);
    }
}
