/*! Test coverage for the IR model, lowering and invocation.
 *
 * Lowering is only trustworthy if malformed input is rejected with the right
 * error kind and well-formed input computes exactly what native arithmetic
 * would. These tests cover both sides.
 */
