//! Encoding of shares exchanged between users.
//!
//! A message is laid out as
//! `sender (2 bytes) ‖ receiver (2 bytes) ‖ payload`, all integers big-endian.
//! A payload with a single field is the field itself; a payload with several
//! fields prefixes each one with its length on 2 bytes. Messages are sealed
//! with a [`ChannelCipher`] under a key derived through [`KeyAgreement`].

use crate::{Error, Result};
use num_bigint::{BigInt, BigUint};
use rand::{CryptoRng, RngCore};
use secagg_math::zp::{FieldElement, PrimeField};
use secagg_traits::{
    ChannelCipher, ChannelKey, DeserializeParametrized, KeyAgreement, SealedMessage, Serialize,
    CHANNEL_KEY_BYTES,
};
use std::sync::Arc;
use zeroize::{Zeroize, Zeroizing};

const ID_BYTES: usize = 2;
const LENGTH_BYTES: usize = 2;

/// A plaintext message carrying share values from one user to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareMessage {
    sender: u16,
    receiver: u16,
    fields: Vec<Vec<u8>>,
}

impl Zeroize for ShareMessage {
    fn zeroize(&mut self) {
        self.fields.iter_mut().for_each(|f| f.zeroize());
    }
}

impl Drop for ShareMessage {
    fn drop(&mut self) {
        self.zeroize();
    }
}

fn user_id(id: usize) -> Result<u16> {
    u16::try_from(id).map_err(|_| Error::Configuration(format!("User id {} exceeds 16 bits", id)))
}

fn read_u16(bytes: &[u8], offset: usize) -> Result<u16> {
    bytes
        .get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or_else(|| Error::integrity("Truncated message"))
}

impl ShareMessage {
    /// Creates a message from the encoded fields.
    pub fn new(sender: usize, receiver: usize, fields: Vec<Vec<u8>>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::configuration("A message carries at least one field"));
        }
        if fields.len() > 1 {
            if let Some(f) = fields.iter().find(|f| f.len() > u16::MAX as usize) {
                return Err(Error::Configuration(format!(
                    "A field of {} bytes exceeds the length prefix",
                    f.len()
                )));
            }
        }
        Ok(Self {
            sender: user_id(sender)?,
            receiver: user_id(receiver)?,
            fields,
        })
    }

    /// The id of the sender.
    pub fn sender(&self) -> usize {
        self.sender as usize
    }

    /// The id of the receiver.
    pub fn receiver(&self) -> usize {
        self.receiver as usize
    }

    /// Number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// The raw bytes of field `i`.
    pub fn field(&self, i: usize) -> Result<&[u8]> {
        self.fields
            .get(i)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Consistency(format!("No field {} in the message", i)))
    }

    /// Field `i` as a non-negative integer.
    pub fn biguint(&self, i: usize) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(self.field(i)?))
    }

    /// Field `i` as a signed integer, in two's complement.
    pub fn bigint(&self, i: usize) -> Result<BigInt> {
        Ok(BigInt::from_signed_bytes_be(self.field(i)?))
    }

    /// Field `i` as an element of `field`.
    pub fn field_element(&self, i: usize, field: &Arc<PrimeField>) -> Result<FieldElement> {
        Ok(FieldElement::from_bytes(self.field(i)?, field)?)
    }

    /// Encode the message. The buffer is wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(Vec::with_capacity(
            2 * ID_BYTES + self.fields.iter().map(|f| f.len() + LENGTH_BYTES).sum::<usize>(),
        ));
        bytes.extend_from_slice(&self.sender.to_be_bytes());
        bytes.extend_from_slice(&self.receiver.to_be_bytes());
        if let [single] = self.fields.as_slice() {
            bytes.extend_from_slice(single);
        } else {
            for f in &self.fields {
                bytes.extend_from_slice(&(f.len() as u16).to_be_bytes());
                bytes.extend_from_slice(f);
            }
        }
        bytes
    }

    /// Decode a message with `field_count` fields.
    pub fn from_bytes(bytes: &[u8], field_count: usize) -> Result<Self> {
        if field_count == 0 {
            return Err(Error::configuration("A message carries at least one field"));
        }
        let sender = read_u16(bytes, 0)?;
        let receiver = read_u16(bytes, ID_BYTES)?;
        let mut offset = 2 * ID_BYTES;

        let fields = if field_count == 1 {
            vec![bytes[offset..].to_vec()]
        } else {
            let mut fields = Vec::with_capacity(field_count);
            for _ in 0..field_count {
                let len = read_u16(bytes, offset)? as usize;
                offset += LENGTH_BYTES;
                let field = bytes
                    .get(offset..offset + len)
                    .ok_or_else(|| Error::integrity("Truncated message"))?;
                fields.push(field.to_vec());
                offset += len;
            }
            if offset != bytes.len() {
                return Err(Error::integrity("Trailing bytes after the last field"));
            }
            fields
        };

        Ok(Self {
            sender,
            receiver,
            fields,
        })
    }

    /// Checks that the message was sent by `sender` to `receiver`.
    pub fn verify(&self, sender: usize, receiver: usize) -> Result<()> {
        if self.receiver() != receiver {
            return Err(Error::Integrity(format!(
                "Message addressed to user {} received by user {}",
                self.receiver, receiver
            )));
        }
        if self.sender() != sender {
            return Err(Error::Integrity(format!(
                "Message from user {} was expected from user {}",
                self.sender, sender
            )));
        }
        Ok(())
    }
}

/// Encode a signed integer field.
pub fn encode_bigint(x: &BigInt) -> Vec<u8> {
    x.to_signed_bytes_be()
}

/// Encode a non-negative integer field.
pub fn encode_biguint(x: &BigUint) -> Vec<u8> {
    x.to_bytes_be()
}

/// Encode a field element.
pub fn encode_field_element(x: &FieldElement) -> Vec<u8> {
    x.to_bytes()
}

/// Derive the channel key shared with a peer: the first
/// [`CHANNEL_KEY_BYTES`] bytes of the agreed secret.
pub fn channel_key<A: KeyAgreement>(secret: &A, peer: &A::PublicKey) -> Result<Zeroizing<ChannelKey>> {
    let shared = Zeroizing::new(
        secret
            .agree(peer)
            .map_err(|e| Error::Integrity(format!("Key agreement failed: {}", e)))?,
    );
    if shared.len() < CHANNEL_KEY_BYTES {
        return Err(Error::Configuration(format!(
            "The agreed secret has {} bytes, at least {} are required",
            shared.len(),
            CHANNEL_KEY_BYTES
        )));
    }
    let mut key = Zeroizing::new([0u8; CHANNEL_KEY_BYTES]);
    key.copy_from_slice(&shared[..CHANNEL_KEY_BYTES]);
    Ok(key)
}

/// Encode and encrypt a message.
pub fn seal<C: ChannelCipher, R: RngCore + CryptoRng>(
    cipher: &C,
    key: &ChannelKey,
    message: &ShareMessage,
    rng: &mut R,
) -> Result<SealedMessage> {
    let plaintext = message.to_bytes();
    cipher
        .encrypt(key, &plaintext, rng)
        .map_err(|e| Error::Integrity(format!("Encryption failed: {}", e)))
}

/// Decrypt and decode a message with `field_count` fields, and check that it
/// was sent by `sender` to `receiver`.
pub fn open<C: ChannelCipher>(
    cipher: &C,
    key: &ChannelKey,
    sealed: &SealedMessage,
    sender: usize,
    receiver: usize,
    field_count: usize,
) -> Result<ShareMessage> {
    let plaintext = Zeroizing::new(
        cipher
            .decrypt(key, sealed)
            .map_err(|e| Error::Integrity(format!("Decryption failed: {}", e)))?,
    );
    let message = ShareMessage::from_bytes(&plaintext, field_count)?;
    message.verify(sender, receiver)?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::{
        channel_key, encode_bigint, encode_biguint, encode_field_element, open, seal, ShareMessage,
    };
    use crate::ErrorKind;
    use num_bigint::{BigInt, BigUint};
    use rand::{CryptoRng, RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use secagg_math::zp::{FieldElement, PrimeField};
    use secagg_traits::{ChannelCipher, ChannelKey, KeyAgreement, SealedMessage};
    use std::error::Error;

    /// A keyed XOR stream with a checksum tag, enough to exercise the sealing
    /// logic.
    struct ToyCipher;

    impl ToyCipher {
        fn keystream(key: &ChannelKey, nonce: &[u8], len: usize) -> Vec<u8> {
            (0..len)
                .map(|i| key[i % key.len()] ^ nonce[i % nonce.len()] ^ (i as u8))
                .collect()
        }

        fn tag(key: &ChannelKey, ciphertext: &[u8]) -> Vec<u8> {
            let sum = ciphertext
                .iter()
                .chain(key.iter())
                .fold(0u32, |acc, &b| acc.wrapping_mul(31).wrapping_add(b as u32));
            sum.to_be_bytes().to_vec()
        }
    }

    impl ChannelCipher for ToyCipher {
        type Error = String;

        fn encrypt<R: RngCore + CryptoRng>(
            &self,
            key: &ChannelKey,
            plaintext: &[u8],
            rng: &mut R,
        ) -> Result<SealedMessage, String> {
            let mut nonce = vec![0u8; 12];
            rng.fill_bytes(&mut nonce);
            let ciphertext = plaintext
                .iter()
                .zip(Self::keystream(key, &nonce, plaintext.len()))
                .map(|(p, k)| p ^ k)
                .collect::<Vec<_>>();
            let tag = Self::tag(key, &ciphertext);
            Ok(SealedMessage {
                ciphertext,
                tag,
                nonce,
            })
        }

        fn decrypt(&self, key: &ChannelKey, sealed: &SealedMessage) -> Result<Vec<u8>, String> {
            if Self::tag(key, &sealed.ciphertext) != sealed.tag {
                return Err("tag mismatch".to_string());
            }
            Ok(sealed
                .ciphertext
                .iter()
                .zip(Self::keystream(key, &sealed.nonce, sealed.ciphertext.len()))
                .map(|(c, k)| c ^ k)
                .collect())
        }
    }

    /// Agreement in the multiplicative group modulo a small prime.
    struct ToyAgreement(u64);

    const P: u64 = 2_147_483_647;

    fn pow_mod(mut base: u64, mut exp: u64) -> u64 {
        let mut acc = 1u64;
        base %= P;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc * base % P;
            }
            base = base * base % P;
            exp >>= 1;
        }
        acc
    }

    impl KeyAgreement for ToyAgreement {
        type PublicKey = u64;
        type Error = String;

        fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> (Self, u64) {
            let sk = rng.next_u64() % (P - 2) + 1;
            (Self(sk), pow_mod(7, sk))
        }

        fn agree(&self, peer: &u64) -> Result<Vec<u8>, String> {
            let shared = pow_mod(*peer, self.0);
            Ok([shared.to_be_bytes(), (!shared).to_be_bytes()].concat())
        }
    }

    #[test]
    fn layout() -> Result<(), Box<dyn Error>> {
        let single = ShareMessage::new(1, 258, vec![vec![0xab, 0xcd]])?;
        assert_eq!(single.to_bytes().as_slice(), &[0, 1, 1, 2, 0xab, 0xcd]);

        let double = ShareMessage::new(3, 4, vec![vec![9], vec![]])?;
        assert_eq!(
            double.to_bytes().as_slice(),
            &[0, 3, 0, 4, 0, 1, 9, 0, 0]
        );
        assert_eq!(ShareMessage::from_bytes(&double.to_bytes(), 2)?, double);
        Ok(())
    }

    #[test]
    fn typed_fields() -> Result<(), Box<dyn Error>> {
        let field = PrimeField::new_arc(64)?;
        let x = FieldElement::from_u64(123456789, &field);
        let k = BigInt::from(-987654321i64);
        let v = BigUint::from(42u32);
        let message = ShareMessage::new(
            2,
            5,
            vec![encode_field_element(&x), encode_bigint(&k), encode_biguint(&v)],
        )?;

        let decoded = ShareMessage::from_bytes(&message.to_bytes(), 3)?;
        decoded.verify(2, 5)?;
        assert_eq!(decoded.field_element(0, &field)?, x);
        assert_eq!(decoded.bigint(1)?, k);
        assert_eq!(decoded.biguint(2)?, v);
        assert_eq!(decoded.field(3).unwrap_err().kind(), ErrorKind::Consistency);
        Ok(())
    }

    #[test]
    fn malformed() -> Result<(), Box<dyn Error>> {
        let kind = |bytes: &[u8], count| ShareMessage::from_bytes(bytes, count).unwrap_err().kind();
        assert_eq!(kind(&[0, 1, 0], 1), ErrorKind::Integrity);
        assert_eq!(kind(&[0, 1, 0, 2, 0, 3, 1], 2), ErrorKind::Integrity);
        assert_eq!(kind(&[0, 1, 0, 2, 0, 1, 1, 0, 0, 7], 2), ErrorKind::Integrity);
        assert_eq!(kind(&[0, 1, 0, 2], 0), ErrorKind::Configuration);

        assert!(ShareMessage::new(1, 2, vec![]).is_err());
        assert!(ShareMessage::new(70000, 2, vec![vec![1]]).is_err());
        assert!(ShareMessage::new(1, 2, vec![vec![0; 70000], vec![1]]).is_err());
        Ok(())
    }

    #[test]
    fn routing() -> Result<(), Box<dyn Error>> {
        let message = ShareMessage::new(1, 2, vec![vec![7]])?;
        assert!(message.verify(1, 2).is_ok());
        assert_eq!(message.verify(1, 3).unwrap_err().kind(), ErrorKind::Integrity);
        assert_eq!(message.verify(4, 2).unwrap_err().kind(), ErrorKind::Integrity);
        assert_eq!(
            message.verify(4, 2).unwrap_err().to_string(),
            "Integrity check failed: Message from user 1 was expected from user 4"
        );
        assert_eq!(
            message.verify(1, 3).unwrap_err().to_string(),
            "Integrity check failed: Message addressed to user 2 received by user 3"
        );
        Ok(())
    }

    #[test]
    fn sealed_exchange() -> Result<(), Box<dyn Error>> {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let (alice, alice_pk) = ToyAgreement::generate(&mut rng);
        let (bob, bob_pk) = ToyAgreement::generate(&mut rng);
        let k_alice = channel_key(&alice, &bob_pk)?;
        let k_bob = channel_key(&bob, &alice_pk)?;
        assert_eq!(*k_alice, *k_bob);

        let message = ShareMessage::new(1, 2, vec![vec![1, 2, 3], vec![4, 5]])?;
        let sealed = seal(&ToyCipher, &k_alice, &message, &mut rng)?;
        assert_eq!(open(&ToyCipher, &k_bob, &sealed, 1, 2, 2)?, message);

        // Wrong peer or tampered ciphertext.
        assert_eq!(
            open(&ToyCipher, &k_bob, &sealed, 3, 2, 2).unwrap_err().kind(),
            ErrorKind::Integrity
        );
        let mut tampered = sealed.clone();
        tampered.ciphertext[0] ^= 1;
        assert_eq!(
            open(&ToyCipher, &k_bob, &tampered, 1, 2, 2).unwrap_err().kind(),
            ErrorKind::Integrity
        );
        Ok(())
    }

    #[test]
    fn short_agreed_secret() {
        struct Short;
        impl KeyAgreement for Short {
            type PublicKey = ();
            type Error = String;
            fn generate<R: RngCore + CryptoRng>(_: &mut R) -> (Self, ()) {
                (Short, ())
            }
            fn agree(&self, _: &()) -> Result<Vec<u8>, String> {
                Ok(vec![0; 8])
            }
        }
        assert_eq!(
            channel_key(&Short, &()).unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }
}
