//! End-to-end phase-sequence scenario (spec §8, scenario 6), driven against
//! a toy mock engine standing in for the out-of-scope Xmodem implementation.

use carrier_transfer::{
    EngineStep, Phase, ProtocolDispatcher, ProtocolKind, TransferEngine, TransferError,
    TransferStats, XmodemVariant,
};

struct MockBlockEngine {
    block_size: u32,
    total_blocks: u32,
}

impl TransferEngine for MockBlockEngine {
    fn process(
        &mut self,
        input: &[u8],
        _output: &mut [u8],
        stats: &mut TransferStats,
    ) -> Result<(usize, usize, EngineStep), TransferError> {
        stats.blocks_transfer += 1;
        stats.bytes_transfer += self.block_size as u64;

        let step = if stats.blocks_transfer >= self.total_blocks {
            EngineStep::FileComplete
        } else {
            EngineStep::Continue
        };
        Ok((input.len(), 0, step))
    }

    fn abort(&mut self, _save_partial: bool, _stats: &mut TransferStats) {}
}

#[test]
fn upload_1024_bytes_in_128_byte_blocks_visits_every_phase_once() {
    let mut dispatcher = ProtocolDispatcher::new();
    dispatcher.start_engine(
        ProtocolKind::Xmodem(XmodemVariant::Checksum),
        Box::new(MockBlockEngine { block_size: 128, total_blocks: 8 }),
    );

    dispatcher.stats_mut().bytes_total = 1024;
    dispatcher.stats_mut().blocks = 8;
    dispatcher.stats_mut().block_size = 128;
    assert_eq!(dispatcher.stats().phase(), Phase::Init);

    dispatcher.stats_mut().set_phase(Phase::FileInfo);
    dispatcher.stats_mut().set_phase(Phase::Transfer);

    let mut observed = vec![Phase::Init, Phase::FileInfo, Phase::Transfer];
    let mut remaining = 0;
    let mut output = [0u8; 64];
    let mut written = 0;

    loop {
        dispatcher
            .process_data(&[0u8; 1], &mut remaining, &mut output, &mut written)
            .unwrap();
        let phase = dispatcher.stats().phase();
        if observed.last() != Some(&phase) {
            observed.push(phase);
        }
        if matches!(phase, Phase::End | Phase::Abort) {
            break;
        }
    }

    assert_eq!(
        observed,
        vec![Phase::Init, Phase::FileInfo, Phase::Transfer, Phase::FileDone, Phase::End]
    );
    assert_eq!(dispatcher.stats().blocks, 8);
    assert_eq!(dispatcher.stats().blocks_transfer, 8);
}
