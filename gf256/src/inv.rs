use super::Element;

fn find_inverse(a: Element) -> Element {
    (1..=255)
        .map(Element)
        .find(|&b| a * b == Element(1))
        .unwrap_or_default()
}

/// Returns the multiplicative inverse of every element, indexed by the element itself.
///
/// Element 0 has no inverse and maps to 0, as the S-box requires.
pub fn inverse_table() -> [Element; 256] {
    let mut ret = [Element(0); 256];
    for (i, inv) in ret.iter_mut().enumerate().skip(1) {
        *inv = find_inverse(Element(i as u8));
    }

    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_nonzero_element_is_invertible() {
        let table = inverse_table();
        assert_eq!(table[0], Element(0));
        for (i, &inv) in table.iter().enumerate().skip(1) {
            assert_eq!(Element(i as u8) * inv, Element(1));
        }
    }
}
