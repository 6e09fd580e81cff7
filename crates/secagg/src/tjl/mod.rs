//! Threshold extensions of the Joye-Libert scheme.
//!
//! The key of every user is shared `t`-out-of-`n` among all users. When some
//! users drop out of a round, each of at least `t` survivors adds its shares of
//! the keys of the dropped users and protects the value zero under that sum.
//! The server combines these zero-shares in the exponent with Lagrange
//! coefficients, which yields `H(tau)^{scale·Σ s_d}` over the dropped users
//! `d`. Raising the product of the online ciphertexts to the same `scale` and
//! multiplying in the compensation completes the mask cancellation, so the
//! server decrypts the sum of the online inputs.
//!
//! Two sharings of the keys are supported:
//! - [`IntegerSharing`](crate::ss::IntegerSharing), with `scale = delta²`,
//! - [`RingSharing`](crate::ss::RingSharing), with `scale = delta`.

mod integer;
mod ring;

use crate::jl::{
    decrypt_slots, encrypt_slots, sum_slots, EncryptedNumber, JoyeLibert, PublicParameters,
    SchemeParameters, ServerKey, UserKey,
};
use crate::ss::{common_length, Share, ThresholdSharing};
use crate::{Error, Result};
use itertools::Itertools;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use rand::{CryptoRng, RngCore};
use std::sync::Arc;

/// A sharing of Joye-Libert user keys whose shares combine in the exponent.
pub trait KeySharing: ThresholdSharing<Coefficient = BigInt> {
    /// The power of `delta` obtained when interpolating shares in the exponent.
    fn compensation_scale(&self) -> BigUint;

    /// Split the key of a user into one share per user.
    fn share_key<R: RngCore + CryptoRng>(
        &self,
        key: &UserKey,
        rng: &mut R,
    ) -> Result<Vec<Share<Self::Value>>>;

    /// The value of a share, as an exponent of `H(tau)`.
    fn exponent(value: &Self::Value) -> BigInt;
}

/// The keys produced by a threshold setup.
#[derive(Debug, Clone)]
pub struct ThresholdSetup<V> {
    /// The public parameters.
    pub public: Arc<PublicParameters>,

    /// The server key.
    pub server: ServerKey,

    /// The key of user `i + 1` at position `i`.
    pub users: Vec<UserKey>,

    /// `shares[i][j]` is the share of the key of user `i + 1` held by user
    /// `j + 1`.
    pub shares: Vec<Vec<Share<V>>>,
}

impl<V: Clone> ThresholdSetup<V> {
    /// The shares held by user `holder` of the keys of the users `owners`.
    /// Users are numbered from 1.
    pub fn shares_held_by(&self, holder: usize, owners: &[usize]) -> Result<Vec<Share<V>>> {
        let users = self.users.len();
        if holder == 0 || holder > users {
            return Err(Error::invalid_index(holder, users));
        }
        owners
            .iter()
            .map(|&owner| {
                if owner == 0 || owner > users {
                    return Err(Error::invalid_index(owner, users));
                }
                Ok(self.shares[owner - 1][holder - 1].clone())
            })
            .collect()
    }
}

/// The Joye-Libert scheme with dropout tolerance.
#[derive(Debug, Clone)]
pub struct ThresholdJoyeLibert<S> {
    base: JoyeLibert,
    sharing: S,
}

impl<S: KeySharing> ThresholdJoyeLibert<S> {
    pub(crate) fn from_parts(par: &Arc<SchemeParameters>, sharing: S) -> Self {
        Self {
            base: JoyeLibert::new(par),
            sharing,
        }
    }

    /// The underlying Joye-Libert scheme.
    pub fn base(&self) -> &JoyeLibert {
        &self.base
    }

    /// The sharing of the user keys.
    pub fn sharing(&self) -> &S {
        &self.sharing
    }

    /// The scheme parameters.
    pub fn parameters(&self) -> &Arc<SchemeParameters> {
        self.base.parameters()
    }

    /// Split the key of a user into one share per user.
    pub fn sk_share<R: RngCore + CryptoRng>(
        &self,
        key: &UserKey,
        rng: &mut R,
    ) -> Result<Vec<Share<S::Value>>> {
        self.sharing.share_key(key, rng)
    }

    pub(crate) fn deal<R: RngCore + CryptoRng>(
        sharing: &S,
        users: &[UserKey],
        rng: &mut R,
    ) -> Result<Vec<Vec<Share<S::Value>>>> {
        users.iter().map(|u| sharing.share_key(u, rng)).collect()
    }

    /// The key share of one survivor: the sum of its shares of the keys of the
    /// dropped users.
    fn key_share(
        &self,
        pp: &Arc<PublicParameters>,
        shares: &[Share<S::Value>],
    ) -> Result<(usize, UserKey)> {
        let sum = Share::sum(shares)?;
        Ok((sum.index(), UserKey::new(S::exponent(sum.value()), pp)))
    }

    /// Protect zero in round `tau` under the sum of the shares held by one
    /// survivor of the keys of the dropped users.
    pub fn share_protect(
        &self,
        pp: &Arc<PublicParameters>,
        shares: &[Share<S::Value>],
        tau: u64,
    ) -> Result<Share<EncryptedNumber>> {
        let (index, key) = self.key_share(pp, shares)?;
        let zero = key.encrypt(&BigUint::zero(), &BigUint::from(tau))?;
        Ok(Share::new(index, zero))
    }

    /// Protect the all-zero encoded vector in round `tau` under the sum of the
    /// shares held by one survivor of the keys of the dropped users.
    pub fn share_protect_vector(
        &self,
        pp: &Arc<PublicParameters>,
        shares: &[Share<S::Value>],
        tau: u64,
    ) -> Result<Share<Vec<EncryptedNumber>>> {
        let encoding = self.base.encoding()?;
        let (index, key) = self.key_share(pp, shares)?;
        let zeros = encrypt_slots(&key, tau, &encoding.zeros())?;
        Ok(Share::new(index, zeros))
    }

    fn combine_in_exponent<'a, I>(&self, pp: &Arc<PublicParameters>, values: I) -> Result<EncryptedNumber>
    where
        I: IntoIterator<Item = (&'a EncryptedNumber, &'a BigInt)>,
    {
        let powers = values
            .into_iter()
            .map(|(c, lambda)| {
                if c.parameters() != pp {
                    return Err(Error::parameters_mismatch());
                }
                c.scale_signed(lambda)
            })
            .collect::<Result<Vec<_>>>()?;
        EncryptedNumber::sum(&powers)
    }

    /// Combine at least `t` zero-shares into the compensation
    /// `H(tau)^{scale·Σ s_d}`.
    pub fn share_combine(
        &self,
        pp: &Arc<PublicParameters>,
        zero_shares: &[Share<EncryptedNumber>],
    ) -> Result<EncryptedNumber> {
        let lagrange = self.sharing.lagrange(zero_shares)?;
        log::debug!("Combining {} zero-shares", zero_shares.len());
        let coefficients = lagrange.for_shares(zero_shares)?;
        self.combine_in_exponent(pp, zero_shares.iter().map(Share::value).zip_eq(coefficients))
    }

    /// Combine at least `t` vector zero-shares slot by slot. The Lagrange
    /// coefficients are computed once for all the slots.
    pub fn share_combine_vector(
        &self,
        pp: &Arc<PublicParameters>,
        zero_shares: &[Share<Vec<EncryptedNumber>>],
    ) -> Result<Vec<EncryptedNumber>> {
        let lagrange = self.sharing.lagrange(zero_shares)?;
        let len = common_length(zero_shares)?;
        log::debug!(
            "Combining {} zero-shares of {} slots",
            zero_shares.len(),
            len
        );
        let coefficients = lagrange.for_shares(zero_shares)?;
        (0..len)
            .map(|i| {
                self.combine_in_exponent(
                    pp,
                    zero_shares
                        .iter()
                        .map(|s| &s.value()[i])
                        .zip_eq(coefficients.iter().copied()),
                )
            })
            .collect()
    }

    /// Protect the value of a user, as in the base scheme.
    pub fn protect(
        &self,
        pp: &Arc<PublicParameters>,
        key: &UserKey,
        tau: u64,
        x: &BigUint,
    ) -> Result<EncryptedNumber> {
        self.base.protect(pp, key, tau, x)
    }

    /// Protect the vector of a user, as in the base scheme.
    pub fn protect_vector(
        &self,
        pp: &Arc<PublicParameters>,
        key: &UserKey,
        tau: u64,
        xs: &[BigUint],
    ) -> Result<Vec<EncryptedNumber>> {
        self.base.protect_vector(pp, key, tau, xs)
    }

    /// Sum and decrypt the protected values of the online users. When users
    /// dropped out, `yzero` is the combined compensation for their keys.
    pub fn agg(
        &self,
        pp: &Arc<PublicParameters>,
        key: &ServerKey,
        tau: u64,
        ys: &[EncryptedNumber],
        yzero: Option<&EncryptedNumber>,
    ) -> Result<BigUint> {
        let Some(yzero) = yzero else {
            return self.base.agg(pp, key, tau, ys);
        };
        if key.parameters() != pp {
            return Err(Error::parameters_mismatch());
        }
        log::debug!("Aggregating {} ciphertexts with compensation", ys.len());
        let scale = self.sharing.compensation_scale();
        let y = EncryptedNumber::sum(ys)?.scale(&scale).try_add(yzero)?;
        key.decrypt(&y, &BigUint::from(tau), &scale)
    }

    /// Sum and decrypt the protected vectors of the online users. When users
    /// dropped out, `yzero` is the combined compensation for their keys.
    pub fn agg_vector(
        &self,
        pp: &Arc<PublicParameters>,
        key: &ServerKey,
        tau: u64,
        ys: &[Vec<EncryptedNumber>],
        yzero: Option<&[EncryptedNumber]>,
    ) -> Result<Vec<BigUint>> {
        let Some(yzero) = yzero else {
            return self.base.agg_vector(pp, key, tau, ys);
        };
        if key.parameters() != pp {
            return Err(Error::parameters_mismatch());
        }
        let encoding = self.base.encoding()?;
        log::debug!(
            "Aggregating {} protected vectors with compensation",
            ys.len()
        );
        let y = sum_slots(ys)?;
        if y.len() != yzero.len() {
            return Err(Error::length_mismatch(y.len(), yzero.len()));
        }
        let scale = self.sharing.compensation_scale();
        let y = y
            .iter()
            .zip_eq(yzero)
            .map(|(y, z)| y.scale(&scale).try_add(z))
            .collect::<Result<Vec<_>>>()?;
        let slots = decrypt_slots(key, tau, &y, &scale)?;
        encoding.decode(&slots)
    }
}
