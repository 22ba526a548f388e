//! EVM bytecode interpreter

use std::collections::HashSet;

use vesper_primitives::U256;

use crate::error::{EvmError, EvmResult};
use crate::frame::Frame;
use crate::gas;
use crate::instructions::Instruction;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::params::Params;
use crate::stack::Stack;
use crate::vm::Vm;
use crate::word;

/// Interpreter state for one frame
#[derive(Clone, Debug)]
pub struct Interpreter {
    /// Frame being executed
    pub(crate) frame: Frame,
    /// Program counter
    pub(crate) pc: usize,
    /// Stack
    pub(crate) stack: Stack,
    /// Memory
    pub(crate) memory: Memory,
    /// Output of the last call or create
    pub(crate) return_data: Vec<u8>,
    /// Bytes produced by RETURN or REVERT
    pub(crate) output: Vec<u8>,
    /// Memory cost already paid in this frame
    highest_memory_cost: u64,
    /// Valid jump destinations
    jump_dests: HashSet<usize>,
    /// Instruction currently executing
    pub(crate) opcode: Opcode,
}

impl Interpreter {
    /// Prepare `frame` for execution
    pub fn new(frame: Frame, params: &Params) -> Self {
        let jump_dests = Self::analyze_jump_dests(&frame.code);
        Self {
            frame,
            pc: 0,
            stack: Stack::with_limit(params.stack_limit),
            memory: Memory::new(),
            return_data: Vec::new(),
            output: Vec::new(),
            highest_memory_cost: 0,
            jump_dests,
            opcode: Opcode::STOP,
        }
    }

    /// Offsets of JUMPDEST bytes that are not PUSH operands
    fn analyze_jump_dests(code: &[u8]) -> HashSet<usize> {
        let mut dests = HashSet::new();
        let mut i = 0;

        while i < code.len() {
            match Opcode::from_byte(code[i]) {
                Some(Opcode::JUMPDEST) => {
                    dests.insert(i);
                }
                Some(opcode) => i += opcode.push_size(),
                None => {}
            }
            i += 1;
        }

        dests
    }

    /// Execute until the frame halts, reverts or faults.
    ///
    /// Running off the end of the code is a successful halt with empty
    /// output. On [`EvmError::Revert`] the revert data is in [`Self::output`].
    pub fn run(&mut self, vm: &mut Vm<'_>) -> EvmResult<()> {
        tracing::debug!(
            depth = vm.depth,
            address = %self.frame.address,
            gas = self.frame.gas,
            code_len = self.frame.code.len(),
            "enter frame"
        );

        let result = self.run_loop(vm);

        tracing::debug!(
            depth = vm.depth,
            address = %self.frame.address,
            gas_left = self.frame.gas,
            error = ?result.as_ref().err(),
            "exit frame"
        );
        result
    }

    fn run_loop(&mut self, vm: &mut Vm<'_>) -> EvmResult<()> {
        while self.pc < self.frame.code.len() {
            if self.step(vm)? {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Execute a single instruction. Returns `true` once the frame has halted.
    pub fn step(&mut self, vm: &mut Vm<'_>) -> EvmResult<bool> {
        let Some(&byte) = self.frame.code.get(self.pc) else {
            return Ok(true);
        };
        let opcode = Opcode::from_byte(byte).ok_or(EvmError::InvalidOpcode(byte))?;
        let instruction = Instruction::for_opcode(opcode, self.stack.limit());

        tracing::trace!(
            pc = self.pc,
            opcode = ?opcode,
            gas = self.frame.gas,
            stack = self.stack.len(),
            "step"
        );

        instruction.stack.check(self.stack.len())?;
        if self.frame.is_static && (instruction.writes || self.transfers_value(opcode)?) {
            return Err(EvmError::WriteProtection);
        }

        self.opcode = opcode;
        if !instruction.jumps {
            self.pc += 1;
        }

        let cost = (instruction.gas)(self, vm)?;
        self.frame.use_gas(cost)?;

        if let Some(memory_size) = instruction.memory {
            if let Some(size) = memory_size(&self.stack)? {
                self.expand_memory(size, &vm.config.params)?;
            }
        }

        let data = (instruction.execute)(self, vm)?;

        if instruction.reverts {
            self.output = data;
            return Err(EvmError::Revert);
        }
        if instruction.halts {
            self.output = data;
            return Ok(true);
        }
        if instruction.returns {
            self.return_data = data;
        }
        Ok(false)
    }

    fn transfers_value(&self, opcode: Opcode) -> EvmResult<bool> {
        Ok(opcode == Opcode::CALL && !self.stack.peek_at(2)?.is_zero())
    }

    /// Charge for and grow memory to cover `size` bytes
    fn expand_memory(&mut self, size: u64, params: &Params) -> EvmResult<()> {
        let cost = gas::memory_cost(params, gas::words(size));
        if cost > self.highest_memory_cost {
            self.frame.use_gas(cost - self.highest_memory_cost)?;
            self.highest_memory_cost = cost;
        }
        let size = usize::try_from(size).map_err(|_| EvmError::OutOfGas)?;
        self.memory.resize(size);
        Ok(())
    }

    /// Move the program counter to a validated JUMPDEST
    pub(crate) fn jump_to(&mut self, dest: U256) -> EvmResult<()> {
        match word::to_usize(dest) {
            Some(dest) if self.jump_dests.contains(&dest) => {
                self.pc = dest;
                Ok(())
            }
            _ => Err(EvmError::InvalidJump(word::saturating_usize(dest))),
        }
    }

    /// Frame being executed
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Operand stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Frame memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Opcode of the instruction currently (or last) executed
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Gas remaining
    pub fn gas_remaining(&self) -> u64 {
        self.frame.gas
    }

    /// Output of the last nested call or create
    pub fn return_data(&self) -> &[u8] {
        &self.return_data
    }

    /// Bytes produced by RETURN or REVERT
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Consume the interpreter, yielding the final frame and the output
    pub fn into_parts(self) -> (Frame, Vec<u8>) {
        (self.frame, self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::{BlockContext, Env};
    use bytes::Bytes;
    use vesper_crypto::keccak256;
    use vesper_primitives::{Address, H256};
    use vesper_state::{MemoryState, Storage};

    fn contract() -> Address {
        Address::from_low_u64(0xc0de)
    }

    fn frame(code: &[u8], gas: u64) -> Frame {
        Frame::new(Address::from_low_u64(0xca11), contract(), U256::zero(), gas)
            .with_code(contract(), Bytes::copy_from_slice(code))
    }

    fn execute(
        state: &mut MemoryState,
        env: &Env,
        frame: Frame,
    ) -> (EvmResult<()>, Interpreter) {
        let config = Config::default();
        let mut vm = Vm::new(state, env, &config);
        let mut interpreter = Interpreter::new(frame, &config.params);
        let result = interpreter.run(&mut vm);
        (result, interpreter)
    }

    fn run_code(code: &[u8], gas: u64) -> (EvmResult<()>, Interpreter) {
        let mut state = MemoryState::new();
        execute(&mut state, &Env::default(), frame(code, gas))
    }

    fn top(interpreter: &Interpreter) -> U256 {
        interpreter.stack().peek_at(0).unwrap()
    }

    fn gas_used(interpreter: &Interpreter, gas: u64) -> u64 {
        gas - interpreter.gas_remaining()
    }

    #[test]
    fn test_stop() {
        let (result, interpreter) = run_code(&[0x00], 100);
        assert_eq!(result, Ok(()));
        assert_eq!(gas_used(&interpreter, 100), 0);
        assert!(interpreter.output().is_empty());
    }

    #[test]
    fn test_empty_code() {
        let (result, interpreter) = run_code(&[], 100);
        assert_eq!(result, Ok(()));
        assert_eq!(interpreter.gas_remaining(), 100);
    }

    #[test]
    fn test_push_add() {
        // PUSH1 2, PUSH1 3, ADD
        let (result, interpreter) = run_code(&[0x60, 0x02, 0x60, 0x03, 0x01], 100);
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::from(5u64));
        assert_eq!(gas_used(&interpreter, 100), 9);
    }

    #[test]
    fn test_return_sum() {
        // PUSH1 5, PUSH1 4, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
        let code = [
            0x60, 0x05, 0x60, 0x04, 0x01, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
        ];
        let (result, interpreter) = run_code(&code, 100_000);
        assert_eq!(result, Ok(()));

        let mut expected = [0u8; 32];
        expected[31] = 9;
        assert_eq!(interpreter.output(), &expected);
    }

    #[test]
    fn test_push_sub() {
        // PUSH1 3, PUSH1 10, SUB
        let (_, interpreter) = run_code(&[0x60, 0x03, 0x60, 0x0a, 0x03], 100);
        assert_eq!(top(&interpreter), U256::from(7u64));
    }

    #[test]
    fn test_sub_wraps() {
        // PUSH1 1, PUSH1 0, SUB
        let (_, interpreter) = run_code(&[0x60, 0x01, 0x60, 0x00, 0x03], 100);
        assert_eq!(top(&interpreter), U256::MAX);
    }

    #[test]
    fn test_div_by_zero() {
        // PUSH1 0, PUSH1 10, DIV
        let (_, interpreter) = run_code(&[0x60, 0x00, 0x60, 0x0a, 0x04], 100);
        assert_eq!(top(&interpreter), U256::zero());
    }

    #[test]
    fn test_lt_and_iszero() {
        // PUSH1 2, PUSH1 1, LT, ISZERO
        let (_, interpreter) = run_code(&[0x60, 0x02, 0x60, 0x01, 0x10, 0x15], 100);
        assert_eq!(top(&interpreter), U256::zero());
    }

    #[test]
    fn test_exp_gas() {
        // PUSH2 0x0100, PUSH1 2, EXP
        let (result, interpreter) = run_code(&[0x61, 0x01, 0x00, 0x60, 0x02, 0x0a], 1000);
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::zero());
        assert_eq!(gas_used(&interpreter, 1000), 3 + 3 + 10 + 2 * 50);
    }

    #[test]
    fn test_sha3_empty() {
        // PUSH1 0, PUSH1 0, SHA3
        let (_, interpreter) = run_code(&[0x60, 0x00, 0x60, 0x00, 0x20], 100);
        assert_eq!(top(&interpreter), keccak256(&[]).to_word());
        assert_eq!(gas_used(&interpreter, 100), 3 + 3 + 30);
    }

    // ==================== Flow ====================

    #[test]
    fn test_jump() {
        // PUSH1 4, JUMP, INVALID, JUMPDEST, PUSH1 1
        let (result, interpreter) = run_code(&[0x60, 0x04, 0x56, 0xfe, 0x5b, 0x60, 0x01], 100);
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::one());
    }

    #[test]
    fn test_jumpi_taken() {
        // PUSH1 1, PUSH1 6, JUMPI, INVALID, JUMPDEST
        let (result, _) = run_code(&[0x60, 0x01, 0x60, 0x06, 0x57, 0xfe, 0x5b], 100);
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_jumpi_not_taken() {
        // PUSH1 0, PUSH1 7, JUMPI, PUSH1 0x2a
        let (result, interpreter) = run_code(&[0x60, 0x00, 0x60, 0x07, 0x57, 0x60, 0x2a], 100);
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::from(0x2au64));
    }

    #[test]
    fn test_invalid_jump() {
        // PUSH1 3, JUMP, STOP, STOP
        let (result, _) = run_code(&[0x60, 0x03, 0x56, 0x00, 0x00], 100);
        assert_eq!(result, Err(EvmError::InvalidJump(3)));
    }

    #[test]
    fn test_jump_to_push_data() {
        // PUSH1 4, JUMP, PUSH1 0x5b, STOP; byte 4 is a PUSH operand
        let (result, _) = run_code(&[0x60, 0x04, 0x56, 0x60, 0x5b, 0x00], 100);
        assert_eq!(result, Err(EvmError::InvalidJump(4)));
    }

    #[test]
    fn test_jump_dest_analysis() {
        // JUMPDEST, PUSH2 0x5b5b, JUMPDEST, PUSH32 ... (truncated)
        let code = [0x5b, 0x61, 0x5b, 0x5b, 0x5b, 0x7f, 0x5b];
        let dests = Interpreter::analyze_jump_dests(&code);
        assert_eq!(dests, HashSet::from([0, 4]));
    }

    #[test]
    fn test_simple_loop() {
        // counter = 3; loop { counter -= 1; if counter != 0 goto loop }
        let code = [
            0x60, 0x03, // PUSH1 3
            0x5b, // JUMPDEST (2)
            0x60, 0x01, // PUSH1 1
            0x90, // SWAP1
            0x03, // SUB
            0x80, // DUP1
            0x60, 0x02, // PUSH1 2
            0x57, // JUMPI
        ];
        let (result, interpreter) = run_code(&code, 10_000);
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::zero());
        assert_eq!(interpreter.stack().len(), 1);
    }

    #[test]
    fn test_pc() {
        // PUSH1 0, POP, PC
        let (_, interpreter) = run_code(&[0x60, 0x00, 0x50, 0x58], 100);
        assert_eq!(top(&interpreter), U256::from(3u64));
    }

    #[test]
    fn test_gas() {
        // GAS
        let (_, interpreter) = run_code(&[0x5a], 100);
        assert_eq!(top(&interpreter), U256::from(98u64));
    }

    // ==================== Push / dup / swap ====================

    #[test]
    fn test_push32() {
        let mut code = vec![0x7f];
        code.extend((1..=32).collect::<Vec<u8>>());
        let (_, interpreter) = run_code(&code, 100);
        assert_eq!(top(&interpreter), U256::from_big_endian(&code[1..]));
    }

    #[test]
    fn test_push_past_end_of_code() {
        // PUSH2 0x01 with the second operand byte missing
        let (result, interpreter) = run_code(&[0x61, 0x01], 100);
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::from(0x0100u64));
    }

    #[test]
    fn test_dup_swap() {
        // PUSH1 1, PUSH1 2, DUP2, SWAP2
        let (_, interpreter) = run_code(&[0x60, 0x01, 0x60, 0x02, 0x81, 0x91], 100);
        let items: Vec<u64> = interpreter.stack().data().iter().map(|w| w.low_u64()).collect();
        assert_eq!(items, vec![1, 2, 1]);
    }

    #[test]
    fn test_dup16() {
        let mut code = Vec::new();
        for i in 1..=16u8 {
            code.extend([0x60, i]);
        }
        code.push(0x8f);
        let (_, interpreter) = run_code(&code, 1000);
        assert_eq!(top(&interpreter), U256::one());
        assert_eq!(interpreter.stack().len(), 17);
    }

    #[test]
    fn test_stack_underflow() {
        // ADD on empty stack
        let (result, _) = run_code(&[0x01], 100);
        assert_eq!(result, Err(EvmError::StackUnderflow));
    }

    #[test]
    fn test_dup_beyond_depth() {
        // PUSH1 1, DUP2
        let (result, _) = run_code(&[0x60, 0x01, 0x81], 100);
        assert_eq!(result, Err(EvmError::StackUnderflow));
    }

    #[test]
    fn test_stack_overflow() {
        // JUMPDEST, PUSH1 1, PUSH1 0, JUMP: one push per iteration
        let (result, interpreter) = run_code(&[0x5b, 0x60, 0x01, 0x60, 0x00, 0x56], 1_000_000);
        assert_eq!(result, Err(EvmError::StackOverflow));
        assert_eq!(interpreter.stack().len(), 1024);
    }

    // ==================== Memory ====================

    #[test]
    fn test_mstore_mload() {
        // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 0, MLOAD
        let (_, interpreter) = run_code(&[0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x00, 0x51], 100);
        assert_eq!(top(&interpreter), U256::from(0x2au64));
    }

    #[test]
    fn test_mstore8_and_msize() {
        // PUSH1 0xff, PUSH1 33, MSTORE8, MSIZE
        let (_, interpreter) = run_code(&[0x60, 0xff, 0x60, 0x21, 0x53, 0x59], 100);
        assert_eq!(top(&interpreter), U256::from(64u64));
        assert_eq!(interpreter.memory().data()[33], 0xff);
    }

    #[test]
    fn test_memory_expansion_gas() {
        // PUSH1 1, PUSH1 0, MSTORE: one word of memory
        let (_, interpreter) = run_code(&[0x60, 0x01, 0x60, 0x00, 0x52], 100);
        assert_eq!(gas_used(&interpreter, 100), 3 + 3 + 3 + 3);

        // the second store into the same word pays no expansion
        let code = [0x60, 0x01, 0x60, 0x00, 0x52, 0x60, 0x02, 0x60, 0x00, 0x52];
        let (_, interpreter) = run_code(&code, 100);
        assert_eq!(gas_used(&interpreter, 100), 3 + 3 + 3 + 3 + 3 + 3 + 3);
    }

    #[test]
    fn test_oversized_memory_is_out_of_gas() {
        // PUSH1 1, PUSH5 0x0100000000, MSTORE
        let code = [0x60, 0x01, 0x64, 0x01, 0x00, 0x00, 0x00, 0x00, 0x52];
        let (result, interpreter) = run_code(&code, 1_000_000);
        assert_eq!(result, Err(EvmError::OutOfGas));
        assert!(interpreter.memory().data().is_empty());
    }

    // ==================== Environment ====================

    #[test]
    fn test_calldataload() {
        let input: Vec<u8> = (1..=40).collect();
        let frame = frame(&[0x60, 0x08, 0x35], 100).with_input(Bytes::from(input.clone()));
        let (_, interpreter) = execute(&mut MemoryState::new(), &Env::default(), frame);
        assert_eq!(top(&interpreter), U256::from_big_endian(&input[8..40]));
    }

    #[test]
    fn test_calldatacopy_zero_pads() {
        // PUSH1 4, PUSH1 0, PUSH1 0, CALLDATACOPY
        let frame =
            frame(&[0x60, 0x04, 0x60, 0x00, 0x60, 0x00, 0x37], 100).with_input(Bytes::from_static(&[0xaa, 0xbb]));
        let (result, interpreter) = execute(&mut MemoryState::new(), &Env::default(), frame);
        assert_eq!(result, Ok(()));
        assert_eq!(&interpreter.memory().data()[..4], &[0xaa, 0xbb, 0, 0]);
    }

    #[test]
    fn test_codesize_codecopy() {
        // CODESIZE, PUSH1 0, PUSH1 0, CODECOPY
        let code = [0x38, 0x60, 0x00, 0x60, 0x00, 0x39];
        let (result, interpreter) = run_code(&code, 100);
        assert_eq!(result, Ok(()));
        assert_eq!(interpreter.stack().len(), 0);
        assert_eq!(&interpreter.memory().data()[..6], &code);
    }

    #[test]
    fn test_caller_and_address() {
        // CALLER, ADDRESS
        let (_, interpreter) = run_code(&[0x33, 0x30], 100);
        assert_eq!(top(&interpreter), contract().to_word());
        assert_eq!(interpreter.stack().peek_at(1).unwrap(), Address::from_low_u64(0xca11).to_word());
    }

    #[test]
    fn test_returndatacopy_out_of_bounds() {
        // PUSH1 1, PUSH1 0, PUSH1 0, RETURNDATACOPY
        let (result, _) = run_code(&[0x60, 0x01, 0x60, 0x00, 0x60, 0x00, 0x3e], 100);
        assert_eq!(result, Err(EvmError::ReturnDataOutOfBounds));
    }

    #[test]
    fn test_blockhash_window() {
        let mut block = BlockContext { number: 300, ..Default::default() };
        block.block_hashes.insert(299, H256::from_low_u64(0x99));
        block.block_hashes.insert(43, H256::from_low_u64(0x43));
        block.block_hashes.insert(44, H256::from_low_u64(0x44));
        let env = Env::new(block, Default::default());

        let blockhash = |number: u8| {
            let (_, interpreter) =
                execute(&mut MemoryState::new(), &env, frame(&[0x61, 0x01, number, 0x40], 100));
            top(&interpreter)
        };
        // 0x012b = 299, 0x012c = 300
        assert_eq!(blockhash(0x2b), U256::from(0x99u64));
        assert_eq!(blockhash(0x2c), U256::zero());

        let older = |number: u8| {
            let (_, interpreter) =
                execute(&mut MemoryState::new(), &env, frame(&[0x60, number, 0x40], 100));
            top(&interpreter)
        };
        assert_eq!(older(44), U256::from(0x44u64));
        assert_eq!(older(43), U256::zero());
    }

    // ==================== Storage / logs ====================

    #[test]
    fn test_sstore_sload() {
        // PUSH1 0x2a, PUSH1 1, SSTORE, PUSH1 1, SLOAD
        let mut state = MemoryState::new();
        let code = [0x60, 0x2a, 0x60, 0x01, 0x55, 0x60, 0x01, 0x54];
        let (result, interpreter) = execute(&mut state, &Env::default(), frame(&code, 30_000));
        assert_eq!(result, Ok(()));
        assert_eq!(top(&interpreter), U256::from(0x2au64));
        assert_eq!(gas_used(&interpreter, 30_000), 3 + 3 + 20_000 + 3 + 200);
        assert_eq!(
            state.get_storage(&contract(), &H256::from_low_u64(1)),
            H256::from_low_u64(0x2a)
        );
    }

    #[test]
    fn test_sstore_clear_refunds() {
        let mut state = MemoryState::new();
        state.set_storage(&contract(), H256::ZERO, H256::from_low_u64(7));
        // PUSH1 0, PUSH1 0, SSTORE
        let (result, interpreter) =
            execute(&mut state, &Env::default(), frame(&[0x60, 0x00, 0x60, 0x00, 0x55], 10_000));
        assert_eq!(result, Ok(()));
        assert_eq!(gas_used(&interpreter, 10_000), 3 + 3 + 5000);
        assert_eq!(state.get_refund(), 15_000);
    }

    #[test]
    fn test_log1() {
        // PUSH1 0xaa, PUSH1 0, MSTORE8, PUSH1 0x11, PUSH1 1, PUSH1 0, LOG1
        let code = [0x60, 0xaa, 0x60, 0x00, 0x53, 0x60, 0x11, 0x60, 0x01, 0x60, 0x00, 0xa1];
        let mut state = MemoryState::new();
        let (result, interpreter) = execute(&mut state, &Env::default(), frame(&code, 10_000));
        assert_eq!(result, Ok(()));
        assert_eq!(gas_used(&interpreter, 10_000), 3 + 3 + 3 + 3 + 3 + 3 + 3 + 375 + 375 + 8);

        let logs = state.logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].address, contract());
        assert_eq!(logs[0].topics, vec![H256::from_low_u64(0x11)]);
        assert_eq!(logs[0].data, vec![0xaa]);
    }

    #[test]
    fn test_static_frame_rejects_sstore() {
        // PUSH1 1, PUSH1 0, SSTORE
        let frame = frame(&[0x60, 0x01, 0x60, 0x00, 0x55], 30_000).with_static(true);
        let (result, _) = execute(&mut MemoryState::new(), &Env::default(), frame);
        assert_eq!(result, Err(EvmError::WriteProtection));
    }

    #[test]
    fn test_static_frame_rejects_value_call() {
        // PUSH1 0 x4, PUSH1 1 (value), PUSH1 0 (to), PUSH1 0 (gas), CALL
        let code = [
            0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x01, 0x60, 0x00, 0x60, 0x00,
            0xf1,
        ];
        let frame = frame(&code, 30_000).with_static(true);
        let (result, _) = execute(&mut MemoryState::new(), &Env::default(), frame);
        assert_eq!(result, Err(EvmError::WriteProtection));
    }

    // ==================== Termination ====================

    #[test]
    fn test_revert() {
        // PUSH1 0x2a, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, REVERT
        let code = [0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xfd];
        let (result, interpreter) = run_code(&code, 1000);
        assert_eq!(result, Err(EvmError::Revert));
        assert_eq!(interpreter.output().len(), 32);
        assert_eq!(interpreter.output()[31], 0x2a);
        assert!(interpreter.gas_remaining() > 0);
    }

    #[test]
    fn test_out_of_gas() {
        // PUSH1 1, PUSH1 2
        let (result, interpreter) = run_code(&[0x60, 0x01, 0x60, 0x02], 5);
        assert_eq!(result, Err(EvmError::OutOfGas));
        assert_eq!(interpreter.gas_remaining(), 0);
    }

    #[test]
    fn test_invalid_opcode() {
        let (result, _) = run_code(&[0x0c], 100);
        assert_eq!(result, Err(EvmError::InvalidOpcode(0x0c)));

        let (result, _) = run_code(&[0xfe], 100);
        assert_eq!(result, Err(EvmError::InvalidOpcode(0xfe)));
    }

    #[test]
    fn test_into_parts() {
        // PUSH1 1, PUSH1 0, RETURN
        let (_, interpreter) = run_code(&[0x60, 0x01, 0x60, 0x00, 0xf3], 100);
        let (frame, output) = interpreter.into_parts();
        assert_eq!(output, vec![0]);
        assert_eq!(frame.address, contract());
    }
}
