//! Threshold Joye-Libert with sharing of the user keys modulo `n·φ(n)`.
//!
//! Only the dealer knows `φ(n)`, so the keys are shared during setup. The
//! scheme itself keeps a public [`RingSharing`] which only computes Lagrange
//! coefficients.

use super::{KeySharing, ThresholdJoyeLibert, ThresholdSetup};
use crate::jl::{PublicParameters, SchemeParameters, UserKey};
use crate::ss::{RingSharing, Share, ThresholdSharing};
use crate::Result;
use num_bigint::{BigInt, BigUint};
use rand::{CryptoRng, RngCore};
use secagg_math::modular::reduce_signed;
use std::sync::Arc;

impl KeySharing for RingSharing {
    fn compensation_scale(&self) -> BigUint {
        self.delta().clone()
    }

    fn share_key<R: RngCore + CryptoRng>(
        &self,
        key: &UserKey,
        rng: &mut R,
    ) -> Result<Vec<Share<BigUint>>> {
        let secret = reduce_signed(key.secret(), self.order()?);
        self.share(&secret, rng)
    }

    fn exponent(value: &BigUint) -> BigInt {
        BigInt::from(value.clone())
    }
}

impl ThresholdJoyeLibert<RingSharing> {
    /// Creates the scheme for the given parameters.
    pub fn new(par: &Arc<SchemeParameters>) -> Self {
        Self::from_parts(par, RingSharing::public(*par.threshold_config()))
    }

    /// Generate the public parameters, the keys and the shares of every user
    /// key modulo `n·φ(n)`. The factorization of `n` is discarded afterwards.
    pub fn setup<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<ThresholdSetup<BigUint>> {
        let (n, phi) = self.base().generate_modulus(rng)?;
        let dealer = RingSharing::new(&n, &phi, *self.parameters().threshold_config())?;
        let public = PublicParameters::new_arc(n)?;
        let (server, users) = self.base().generate_keys(&public, rng);
        let shares = Self::deal(&dealer, &users, rng)?;
        log::debug!(
            "Shared {} user keys modulo n·φ(n) with threshold {}",
            users.len(),
            self.parameters().threshold()
        );
        Ok(ThresholdSetup {
            public,
            server,
            users,
            shares,
        })
    }
}
