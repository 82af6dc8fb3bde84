//! Radix-2 complex FFT on split real/imaginary buffers.

use std::f64::consts::PI;

/// Smallest power of two that is `>= n` (1 for `n == 0`).
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// In-place forward FFT. Both slices must share the same power-of-2 length.
pub fn fft(re: &mut [f64], im: &mut [f64]) {
    transform(re, im, false);
}

/// In-place inverse FFT, scaled by `1/n`.
pub fn ifft(re: &mut [f64], im: &mut [f64]) {
    transform(re, im, true);
    let scale = 1.0 / re.len() as f64;
    re.iter_mut().for_each(|v| *v *= scale);
    im.iter_mut().for_each(|v| *v *= scale);
}

fn transform(re: &mut [f64], im: &mut [f64], inverse: bool) {
    let n = re.len();
    debug_assert_eq!(n, im.len());
    debug_assert!(n.is_power_of_two() || n == 0);
    if n <= 1 {
        return;
    }

    let bits = n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> (usize::BITS - bits);
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = sign * 2.0 * PI / len as f64;
        for k in 0..half {
            let (w_im, w_re) = (step * k as f64).sin_cos();
            let mut a = k;
            while a < n {
                let b = a + half;
                let t_re = w_re * re[b] - w_im * im[b];
                let t_im = w_re * im[b] + w_im * re[b];
                re[b] = re[a] - t_re;
                im[b] = im[a] - t_im;
                re[a] += t_re;
                im[a] += t_im;
                a += len;
            }
        }
        len <<= 1;
    }
}
