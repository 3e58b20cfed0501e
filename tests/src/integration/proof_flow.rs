//! # Proof and Signature Flow
//!
//! A batch of payloads is committed to a Merkle root, the root is signed,
//! and a receiver checks both the signer and each payload's inclusion.

#[cfg(test)]
mod tests {
    use crate::helpers::{healthy_mock, mock_client, Signer};
    use bc_03_merkle::{hash_leaf, verify_proof, MerkleTree};
    use bc_04_signature_verification::{SignatureVerifier, VerificationRequest};
    use blade_client::BladeClient;
    use shared_types::{decode_word, DecodedWord, WordMode};

    fn batch() -> Vec<[u8; 32]> {
        (0u8..5)
            .map(|i| {
                let mut leaf = [0u8; 32];
                leaf[31] = i;
                leaf[0] = 0xb1;
                leaf
            })
            .collect()
    }

    #[test]
    fn test_signed_root_and_inclusion() -> anyhow::Result<()> {
        let leaves = batch();
        let tree = MerkleTree::build(&leaves)?;
        let signer = Signer::random();
        let signature = signer.sign(&tree.root(), Some(4))?;

        let verifier = SignatureVerifier::new(4);
        assert!(verifier.verify(
            &tree.root(),
            signature.v,
            &signature.r,
            &signature.s,
            &signer.address
        ));

        for leaf in &leaves {
            let proof = BladeClient::merkle_proof(&leaves, leaf)?;
            assert_eq!(proof.root, tree.root());
            assert!(verify_proof(leaf, &proof));
        }

        // A leaf from another batch does not verify against this root.
        let proof = tree.proof(&leaves[4])?;
        assert!(!verify_proof(&[0u8; 32], &proof));
        Ok(())
    }

    #[tokio::test]
    async fn test_client_verifier_uses_configured_network() -> anyhow::Result<()> {
        let mock = healthy_mock();
        let client = mock_client(&mock)?;
        let network = client.config().network_id;
        let hash = hash_leaf(b"payload");
        let signer = Signer::random();

        let protected = signer.sign(&hash, Some(network))?;
        assert!(client.verify_signature(&hash, protected.v, &protected.r, &protected.s, &signer.address));

        let other_network = signer.sign(&hash, Some(network + 1))?;
        assert!(!client.verify_signature(
            &hash,
            other_network.v,
            &other_network.r,
            &other_network.s,
            &signer.address
        ));

        let legacy = signer.sign(&hash, None)?;
        assert!(client.verify_signature(&hash, legacy.v, &legacy.r, &legacy.s, &signer.address));

        // Exact comparison: an upper-cased claim never matches.
        let shouted = format!("0x{}", signer.address[2..].to_uppercase());
        assert!(!client.verify_signature(&hash, legacy.v, &legacy.r, &legacy.s, &shouted));
        Ok(())
    }

    #[test]
    fn test_batch_verification_mixes_results() -> anyhow::Result<()> {
        let verifier = SignatureVerifier::new(1);
        let alice = Signer::random();
        let bob = Signer::random();
        let hash = hash_leaf(b"order #1");

        let requests = vec![
            VerificationRequest {
                payload_hash: hash,
                signature: alice.sign(&hash, Some(1))?,
                network_id: 1,
                claimed_address: alice.address.clone(),
            },
            VerificationRequest {
                payload_hash: hash,
                signature: bob.sign(&hash, Some(1))?,
                network_id: 1,
                claimed_address: alice.address.clone(),
            },
        ];

        let batch = verifier.batch_verify(&requests);
        assert!(batch.results[0].valid);
        assert!(!batch.results[1].valid);
        assert_eq!(
            batch.results[1].recovered_address.as_ref().map(|a| a.to_hex()),
            Some(bob.address.clone())
        );
        Ok(())
    }

    #[test]
    fn test_signer_address_round_trips_through_word_codec() -> anyhow::Result<()> {
        let signer = Signer::random();
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&hex::decode(&signer.address[2..])?);

        match decode_word(&word, WordMode::Address)? {
            DecodedWord::Address(address) => assert_eq!(address.to_hex(), signer.address),
            other => anyhow::bail!("unexpected decoding: {other:?}"),
        }
        Ok(())
    }
}
