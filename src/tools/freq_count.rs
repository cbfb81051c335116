use rayon::prelude::*;

/// Returns a frequency count of the input data, one u64 slot per possible
/// byte value. Uses parallelism when the data set is over 64k; counts are
/// commutative and associative, so chunk tables merge by plain addition.
pub fn freqs(data: &[u8]) -> Vec<u64> {
    if data.len() > 64_000 {
        // 16k is pretty much the sweet spot for chunk size.
        data.par_chunks(16_000)
            .fold(
                || vec![0_u64; 256],
                |mut freqs, chunk| {
                    chunk.iter().for_each(|&el| freqs[el as usize] += 1);
                    freqs
                },
            )
            .reduce(
                || vec![0_u64; 256],
                |s, f| s.iter().zip(&f).map(|(a, b)| a + b).collect::<Vec<u64>>(),
            )
    } else {
        let mut freqs = vec![0_u64; 256];
        data.iter().for_each(|&el| freqs[el as usize] += 1);
        freqs
    }
}

#[cfg(test)]
mod test {
    use super::freqs;

    #[test]
    fn empty_input_counts_nothing() {
        assert_eq!(freqs(b""), vec![0_u64; 256]);
    }

    #[test]
    fn counts_sum_to_input_length() {
        let data = b"Making a silly test.";
        let f = freqs(data);
        assert_eq!(f.iter().sum::<u64>(), data.len() as u64);
        assert_eq!(f[b'i' as usize], 2);
        assert_eq!(f[b'.' as usize], 1);
        assert_eq!(f[b'z' as usize], 0);
    }

    #[test]
    fn parallel_path_matches_serial_path() {
        // Big enough to cross the 64k threshold.
        let data: Vec<u8> = (0..100_000_u32).map(|i| (i % 251) as u8).collect();
        let serial = {
            let mut f = vec![0_u64; 256];
            data.iter().for_each(|&el| f[el as usize] += 1);
            f
        };
        assert_eq!(freqs(&data), serial);
    }
}
