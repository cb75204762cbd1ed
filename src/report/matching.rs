/// Whether two publisher names are probably the same publisher.
///
/// Spaces are dropped and case is ignored; the names match when their longest
/// common subsequence is longer than 4/5 of the shorter name.
pub fn same_name(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().filter(|c| *c != ' ').flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().filter(|c| *c != ' ').flat_map(char::to_lowercase).collect();
    let shorter = a.len().min(b.len());

    lcs_len(&a, &b) * 5 > shorter * 4
}

/// Length of the longest common subsequence, in O(len(b)) memory.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];

    for ca in a {
        let mut diagonal = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn case_and_spaces_are_ignored() {
        assert!(same_name("Electronic Arts", "electronic arts"));
        assert!(same_name("ElectronicArts", "Electronic Arts"));
    }

    #[test]
    fn unrelated_publishers_do_not_match() {
        assert!(!same_name("Square Enix", "2K Games"));
        assert!(!same_name("Valve", "Ubisoft"));
    }

    #[test]
    fn longer_corporate_names_still_match() {
        assert!(same_name("Valve", "Valve Corporation"));
        assert!(same_name("Bandai Namco", "BANDAI NAMCO Entertainment"));
    }

    #[test]
    fn threshold_is_strict() {
        // lcs 4 of a 5 character name is exactly 4/5
        assert!(!same_name("abcde", "abcdx"));
        assert!(same_name("abcde", "abcde"));
    }

    #[test]
    fn empty_names_never_match() {
        assert!(!same_name("", ""));
        assert!(!same_name("", "Valve"));
        assert!(!same_name("   ", "Valve"));
    }

    #[test]
    fn lengths_are_counted_after_lowercasing() {
        // 'İ' lowercases to 'i' plus a combining dot
        assert!(!same_name("İİ", "iixxxx"));
        assert!(same_name("İstanbul Games", "i\u{307}stanbul games"));
    }

    #[test]
    fn lcs_counts_non_contiguous_characters() {
        assert_eq!(lcs_len(&chars("abcbdab"), &chars("bdcaba")), 4);
        assert_eq!(lcs_len(&chars("abc"), &chars("")), 0);
        assert_eq!(lcs_len(&chars("abc"), &chars("abc")), 3);
    }
}
