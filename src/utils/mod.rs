pub mod jwt;
pub mod password;

use subtle::ConstantTimeEq;

/// Compare deux valeurs en temps constant (codes de vérification, hash)
/// Une différence de longueur renvoie false sans court-circuiter sur le contenu
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let lengths_equal = a.len().ct_eq(&b.len());

    let max_len = a.len().max(b.len());
    let mut a_padded = vec![0u8; max_len];
    let mut b_padded = vec![0xFFu8; max_len];
    a_padded[..a.len()].copy_from_slice(a);
    b_padded[..b.len()].copy_from_slice(b);

    (lengths_equal & a_padded.ct_eq(&b_padded)).into()
}
