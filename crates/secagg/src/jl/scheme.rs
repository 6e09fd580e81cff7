//! Setup, protection and aggregation of the Joye-Libert scheme.

use crate::jl::{
    EncryptedNumber, PublicParameters, SchemeParameters, ServerKey, UserKey, VectorEncoding,
};
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};
use secagg_util::generate_prime;
use std::sync::Arc;

/// The Joye-Libert private stream aggregation scheme.
///
/// Every user key is a random integer and the server key is the opposite of
/// their sum, so that the masks `H(tau)^s` of all users cancel out in the
/// aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoyeLibert {
    par: Arc<SchemeParameters>,
}

impl JoyeLibert {
    /// Creates the scheme for the given parameters.
    pub fn new(par: &Arc<SchemeParameters>) -> Self {
        Self { par: par.clone() }
    }

    /// The scheme parameters.
    pub fn parameters(&self) -> &Arc<SchemeParameters> {
        &self.par
    }

    /// Generate the public parameters, the server key and one key per user.
    pub fn setup<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(Arc<PublicParameters>, ServerKey, Vec<UserKey>)> {
        let (n, _) = self.generate_modulus(rng)?;
        let pp = PublicParameters::new_arc(n)?;
        let (server, users) = self.generate_keys(&pp, rng);
        Ok((pp, server, users))
    }

    /// Generate an RSA modulus of exactly `key_size / 2` bits from two distinct
    /// primes of `key_size / 4` bits, and its Euler totient.
    pub(crate) fn generate_modulus<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint)> {
        let modulus_bits = self.par.modulus_bits();
        let prime_bits = modulus_bits / 2;
        loop {
            let p = generate_prime(prime_bits, rng).map_err(Error::configuration)?;
            let q = generate_prime(prime_bits, rng).map_err(Error::configuration)?;
            if p == q {
                continue;
            }
            let n = &p * &q;
            if n.bits() as usize == modulus_bits {
                log::debug!(
                    "Generated a {}-bit modulus for {} users",
                    modulus_bits,
                    self.par.users()
                );
                let phi = (p - 1u32) * (q - 1u32);
                return Ok((n, phi));
            }
            log::trace!("Discarding a {}-bit modulus", n.bits());
        }
    }

    /// Sample one key of `key_size` bits per user, and the server key
    /// `s_0 = -Σ s_i`.
    pub(crate) fn generate_keys<R: RngCore + CryptoRng>(
        &self,
        pp: &Arc<PublicParameters>,
        rng: &mut R,
    ) -> (ServerKey, Vec<UserKey>) {
        let users = (0..self.par.users())
            .map(|_| UserKey::from_biguint(rng.gen_biguint(self.par.key_size() as u64), pp))
            .collect_vec();
        let s0: BigInt = users.iter().map(|u| u.secret()).sum();
        (ServerKey::new(-s0, pp), users)
    }

    fn check_key(&self, pp: &Arc<PublicParameters>, key_par: &Arc<PublicParameters>) -> Result<()> {
        if pp != key_par {
            return Err(Error::Consistency(
                "The key was generated for different public parameters".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn encoding(&self) -> Result<&VectorEncoding> {
        self.par
            .vector_encoding()
            .ok_or_else(|| Error::configuration("No vector encoding is configured"))
    }

    /// Protect the value `x < n` of a user in round `tau`.
    pub fn protect(
        &self,
        pp: &Arc<PublicParameters>,
        key: &UserKey,
        tau: u64,
        x: &BigUint,
    ) -> Result<EncryptedNumber> {
        self.check_key(pp, key.parameters())?;
        key.encrypt(x, &BigUint::from(tau))
    }

    /// Protect a vector of values in round `tau`, using the configured vector
    /// encoding. Each slot is encrypted under its own tag.
    pub fn protect_vector(
        &self,
        pp: &Arc<PublicParameters>,
        key: &UserKey,
        tau: u64,
        xs: &[BigUint],
    ) -> Result<Vec<EncryptedNumber>> {
        self.check_key(pp, key.parameters())?;
        let slots = self.encoding()?.encode(xs)?;
        encrypt_slots(key, tau, &slots)
    }

    /// Sum and decrypt the protected values of every user.
    pub fn agg(
        &self,
        pp: &Arc<PublicParameters>,
        key: &ServerKey,
        tau: u64,
        ys: &[EncryptedNumber],
    ) -> Result<BigUint> {
        self.check_key(pp, key.parameters())?;
        log::debug!("Aggregating {} ciphertexts", ys.len());
        let y = EncryptedNumber::sum(ys)?;
        key.decrypt(&y, &BigUint::from(tau), &BigUint::one())
    }

    /// Sum and decrypt the protected vectors of every user.
    pub fn agg_vector(
        &self,
        pp: &Arc<PublicParameters>,
        key: &ServerKey,
        tau: u64,
        ys: &[Vec<EncryptedNumber>],
    ) -> Result<Vec<BigUint>> {
        self.check_key(pp, key.parameters())?;
        let encoding = self.encoding()?;
        log::debug!("Aggregating {} protected vectors", ys.len());
        let y = sum_slots(ys)?;
        let slots = decrypt_slots(key, tau, &y, &BigUint::one())?;
        encoding.decode(&slots)
    }
}

/// Encrypt the slots of an encoded vector, slot `i` under the tag of counter `i`.
pub(crate) fn encrypt_slots(
    key: &UserKey,
    tau: u64,
    slots: &[BigUint],
) -> Result<Vec<EncryptedNumber>> {
    slots
        .iter()
        .enumerate()
        .map(|(i, x)| key.encrypt(x, &key.parameters().slot_tag(tau, i)?))
        .collect()
}

/// Decrypt aggregated slots, slot `i` under the tag of counter `i`.
pub(crate) fn decrypt_slots(
    key: &ServerKey,
    tau: u64,
    ys: &[EncryptedNumber],
    scale: &BigUint,
) -> Result<Vec<BigUint>> {
    ys.iter()
        .enumerate()
        .map(|(i, y)| key.decrypt(y, &key.parameters().slot_tag(tau, i)?, scale))
        .collect()
}

/// Slot-wise homomorphic sum of protected vectors of the same length.
pub(crate) fn sum_slots(ys: &[Vec<EncryptedNumber>]) -> Result<Vec<EncryptedNumber>> {
    let first = ys.first().ok_or_else(|| Error::insufficient_shares(0, 1))?;
    if let Some(y) = ys.iter().find(|y| y.len() != first.len()) {
        return Err(Error::length_mismatch(first.len(), y.len()));
    }
    (0..first.len())
        .map(|i| EncryptedNumber::sum(ys.iter().map(|y| &y[i])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::JoyeLibert;
    use crate::jl::{SchemeParametersBuilder, VectorEncoding};
    use crate::ErrorKind;
    use itertools::Itertools;
    use num_bigint::{BigInt, BigUint};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::error::Error;

    #[test]
    fn modulus_size() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let par = SchemeParametersBuilder::new()
            .set_users(3)
            .set_key_size(256)
            .build_arc()?;
        let jl = JoyeLibert::new(&par);
        let (n, phi) = jl.generate_modulus(&mut rng)?;
        assert_eq!(n.bits(), 128);
        assert!(phi < n);
        Ok(())
    }

    #[test]
    fn keys_sum_to_zero() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let par = SchemeParametersBuilder::new()
            .set_users(7)
            .set_key_size(256)
            .build_arc()?;
        let (_, server, users) = JoyeLibert::new(&par).setup(&mut rng)?;
        assert_eq!(users.len(), 7);
        let total = users.iter().map(|u| u.secret()).sum::<BigInt>() + server.secret();
        assert_eq!(total, BigInt::from(0));
        Ok(())
    }

    #[test]
    fn aggregate() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let par = SchemeParametersBuilder::new()
            .set_users(5)
            .set_key_size(512)
            .build_arc()?;
        let jl = JoyeLibert::new(&par);
        let (pp, server, users) = jl.setup(&mut rng)?;

        let values = [3u32, 1, 4, 1, 5].map(BigUint::from);
        let ys = users
            .iter()
            .zip(&values)
            .map(|(u, x)| jl.protect(&pp, u, 7, x))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(jl.agg(&pp, &server, 7, &ys)?, BigUint::from(14u32));

        // Decrypting in another round or without one of the users fails.
        assert_eq!(
            jl.agg(&pp, &server, 8, &ys).unwrap_err().kind(),
            ErrorKind::Arithmetic
        );
        assert_eq!(
            jl.agg(&pp, &server, 7, &ys[1..]).unwrap_err().kind(),
            ErrorKind::Arithmetic
        );
        Ok(())
    }

    #[test]
    fn aggregate_vectors() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let par = SchemeParametersBuilder::new()
            .set_users(4)
            .set_key_size(512)
            .set_vector_encoding(VectorEncoding::new(200, 4, 16, 30)?)
            .build_arc()?;
        let jl = JoyeLibert::new(&par);
        let (pp, server, users) = jl.setup(&mut rng)?;

        let vectors = (0..4u32)
            .map(|u| (0..30u32).map(|i| BigUint::from(u * 1000 + i)).collect_vec())
            .collect_vec();
        let ys = users
            .iter()
            .zip(&vectors)
            .map(|(u, x)| jl.protect_vector(&pp, u, 11, x))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(ys[0].len(), 3);

        let expected = (0..30u32)
            .map(|i| BigUint::from(6000 + 4 * i))
            .collect_vec();
        assert_eq!(jl.agg_vector(&pp, &server, 11, &ys)?, expected);
        Ok(())
    }

    #[test]
    fn mismatched_keys() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let par = SchemeParametersBuilder::new()
            .set_users(2)
            .set_key_size(256)
            .build_arc()?;
        let jl = JoyeLibert::new(&par);
        let (pp, _, _) = jl.setup(&mut rng)?;
        let (_, _, other_users) = jl.setup(&mut rng)?;
        assert_eq!(
            jl.protect(&pp, &other_users[0], 1, &BigUint::from(1u32))
                .unwrap_err()
                .kind(),
            ErrorKind::Consistency
        );
        assert_eq!(
            jl.protect_vector(&pp, &other_users[0], 1, &[])
                .unwrap_err()
                .kind(),
            ErrorKind::Consistency
        );
        Ok(())
    }

    #[test]
    fn vectors_need_an_encoding() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let par = SchemeParametersBuilder::new()
            .set_users(2)
            .set_key_size(256)
            .build_arc()?;
        let jl = JoyeLibert::new(&par);
        let (pp, _, users) = jl.setup(&mut rng)?;
        assert_eq!(
            jl.protect_vector(&pp, &users[0], 1, &[BigUint::from(1u32)])
                .unwrap_err()
                .kind(),
            ErrorKind::Configuration
        );
        Ok(())
    }
}
